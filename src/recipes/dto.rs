use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::Recipe;

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub calories: i64,
    pub ingredient: String,
    pub directions: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub calories: Option<i64>,
    pub ingredient: Option<String>,
    pub directions: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRecipe {
    pub recipe_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RecipeList {
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Serialize)]
pub struct RecipeData {
    pub recipe: Recipe,
}

impl CreateRecipeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty");
        }
        if self.calories < 0 {
            return Err("calories must not be negative");
        }
        Ok(())
    }
}

impl UpdateRecipeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be empty");
        }
        if self.calories.is_some_and(|c| c < 0) {
            return Err("calories must not be negative");
        }
        Ok(())
    }
}

use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub calories: i64,
    pub ingredient: String,
    pub directions: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub struct NewRecipe<'a> {
    pub name: &'a str,
    pub calories: i64,
    pub ingredient: &'a str,
    pub directions: &'a str,
}

#[derive(Debug, Default)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub calories: Option<i64>,
    pub ingredient: Option<String>,
    pub directions: Option<String>,
}

pub async fn insert(db: &PgPool, recipe: NewRecipe<'_>) -> anyhow::Result<Recipe> {
    let row = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (id, name, calories, ingredient, directions)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, calories, ingredient, directions, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(recipe.name)
    .bind(recipe.calories)
    .bind(recipe.ingredient)
    .bind(recipe.directions)
    .fetch_one(db)
    .await
    .context("insert recipe")?;
    Ok(row)
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, name, calories, ingredient, directions, created_at, updated_at
          FROM recipes
         ORDER BY created_at DESC
         LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list recipes")?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, name, calories, ingredient, directions, created_at, updated_at
          FROM recipes
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("get recipe")?;
    Ok(row)
}

pub async fn update(db: &PgPool, id: Uuid, changes: RecipeChanges) -> anyhow::Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipes
           SET name       = COALESCE($2, name),
               calories   = COALESCE($3, calories),
               ingredient = COALESCE($4, ingredient),
               directions = COALESCE($5, directions),
               updated_at = now()
         WHERE id = $1
        RETURNING id, name, calories, ingredient, directions, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.calories)
    .bind(changes.ingredient)
    .bind(changes.directions)
    .fetch_optional(db)
    .await
    .context("update recipe")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete recipe")?;
    Ok(res.rows_affected() > 0)
}

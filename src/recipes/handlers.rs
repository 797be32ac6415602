use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateRecipeRequest, CreatedRecipe, RecipeData, RecipeList, UpdateRecipeRequest},
    repo::{self, NewRecipe, RecipeChanges},
};
use crate::{
    auth::services::AuthUser,
    error::ApiError,
    response::{created, done, ok, Pagination, Reply},
    state::AppState,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

fn internal(context: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        error!(error = %e, "{context}");
        ApiError::storage(context, format!("{e:#}"))
    }
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<Reply<CreatedRecipe>, ApiError> {
    payload
        .validate()
        .map_err(|msg| ApiError::BadRequest(msg.into()))?;

    let recipe = repo::insert(
        &state.db,
        NewRecipe {
            name: payload.name.trim(),
            calories: payload.calories,
            ingredient: &payload.ingredient,
            directions: &payload.directions,
        },
    )
    .await
    .map_err(internal("Failed to add recipe"))?;

    info!(recipe_id = %recipe.id, "recipe added");
    Ok(created("Recipe successfully added", CreatedRecipe { recipe_id: recipe.id }))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Reply<RecipeList>, ApiError> {
    let (limit, offset) = p.clamped();
    let recipes = repo::list(&state.db, limit, offset)
        .await
        .map_err(internal("Failed to fetch recipes"))?;
    Ok(ok("Recipes retrieved successfully", RecipeList { recipes }))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Reply<RecipeData>, ApiError> {
    let recipe = repo::get(&state.db, id)
        .await
        .map_err(internal("Failed to fetch recipe"))?
        .ok_or(ApiError::NotFound("Recipe"))?;
    Ok(ok("Recipe retrieved successfully", RecipeData { recipe }))
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> Result<Reply<RecipeData>, ApiError> {
    payload
        .validate()
        .map_err(|msg| ApiError::BadRequest(msg.into()))?;

    let changes = RecipeChanges {
        name: payload.name.map(|n| n.trim().to_string()),
        calories: payload.calories,
        ingredient: payload.ingredient,
        directions: payload.directions,
    };
    let recipe = repo::update(&state.db, id, changes)
        .await
        .map_err(internal("Failed to update recipe"))?
        .ok_or(ApiError::NotFound("Recipe"))?;

    info!(recipe_id = %recipe.id, "recipe updated");
    Ok(ok("Recipe successfully updated", RecipeData { recipe }))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Reply<()>, ApiError> {
    if !repo::delete(&state.db, id)
        .await
        .map_err(internal("Failed to delete recipe"))?
    {
        return Err(ApiError::NotFound("Recipe"));
    }
    info!(recipe_id = %id, "recipe deleted");
    Ok(done("Recipe successfully deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rules() {
        let mut req = CreateRecipeRequest {
            name: "Gado-gado".into(),
            calories: 420,
            ingredient: "vegetables, peanut sauce".into(),
            directions: "mix".into(),
        };
        assert!(req.validate().is_ok());

        req.calories = -1;
        assert_eq!(req.validate(), Err("calories must not be negative"));

        req.calories = 1;
        req.name = " ".into();
        assert_eq!(req.validate(), Err("name must not be empty"));
    }

    #[test]
    fn empty_update_is_allowed() {
        assert!(UpdateRecipeRequest::default().validate().is_ok());
        let bad = UpdateRecipeRequest {
            calories: Some(-10),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    mod db {
        use axum::http::{Method, StatusCode};
        use serde_json::{json, Value};
        use sqlx::PgPool;
        use uuid::Uuid;

        use crate::{
            state::AppState,
            test_support::{bearer, request, send},
        };

        async fn add(state: &AppState, auth: &str, name: &str, calories: i64) -> String {
            let body = json!({
                "name": name,
                "calories": calories,
                "ingredient": "rice",
                "directions": "cook",
            });
            let (status, body) = send(
                state.clone(),
                request(Method::POST, "/api/v1/recipes", Some(auth), Some(body)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            body["data"]["recipeId"].as_str().unwrap().to_string()
        }

        async fn list_len(state: &AppState, auth: &str, query: &str) -> usize {
            let (status, body): (StatusCode, Value) = send(
                state.clone(),
                request(Method::GET, &format!("/api/v1/recipes{query}"), Some(auth), None),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            body["data"]["recipes"].as_array().map(Vec::len).unwrap_or_default()
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn pagination_bounds_reach_the_query(pool: PgPool) {
            let state = AppState::with_pool(pool);
            let auth = bearer(&state, "admin");
            for (name, kcal) in [("Soto", 310), ("Rendang", 470), ("Pecel", 260)] {
                add(&state, &auth, name, kcal).await;
            }

            assert_eq!(list_len(&state, &auth, "").await, 3);
            assert_eq!(list_len(&state, &auth, "?limit=2").await, 2);
            assert_eq!(list_len(&state, &auth, "?limit=2&offset=2").await, 1);
            assert_eq!(list_len(&state, &auth, "?limit=0").await, 1);
            assert_eq!(list_len(&state, &auth, "?offset=-5").await, 3);
            assert_eq!(list_len(&state, &auth, "?offset=10").await, 0);
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn partial_update_keeps_unsent_fields(pool: PgPool) {
            let state = AppState::with_pool(pool);
            let auth = bearer(&state, "admin");
            let id = add(&state, &auth, "Gado-gado", 420).await;
            let uri = format!("/api/v1/recipes/{id}");

            let (status, body) = send(
                state.clone(),
                request(Method::PUT, &uri, Some(&auth), Some(json!({ "calories": 380 }))),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["recipe"]["calories"], 380);
            assert_eq!(body["data"]["recipe"]["name"], "Gado-gado");
            assert_eq!(body["data"]["recipe"]["ingredient"], "rice");

            let (_, body) = send(state.clone(), request(Method::GET, &uri, Some(&auth), None)).await;
            assert_eq!(body["data"]["recipe"]["calories"], 380);

            let (status, _) = send(state.clone(), request(Method::DELETE, &uri, Some(&auth), None)).await;
            assert_eq!(status, StatusCode::OK);
            let (status, _) = send(state, request(Method::DELETE, &uri, Some(&auth), None)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn unknown_id_is_not_found(pool: PgPool) {
            let state = AppState::with_pool(pool);
            let auth = bearer(&state, "admin");
            let uri = format!("/api/v1/recipes/{}", Uuid::new_v4());

            for (method, body) in [
                (Method::GET, None),
                (Method::PUT, Some(json!({ "name": "Ghost" }))),
                (Method::DELETE, None),
            ] {
                let (status, body) = send(state.clone(), request(method, &uri, Some(&auth), body)).await;
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body["message"], "Recipe not found");
            }
        }
    }
}

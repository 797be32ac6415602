use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::{
    dto::PredictRequest,
    repo::FoodLogEntry,
    services::{calorie_report, CalorieReport},
};
use crate::{
    auth::services::AuthUser,
    error::ApiError,
    response::{created, ok, Reply},
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(record_prediction))
        .route("/calories", get(get_calories))
}

/// POST /predict: log a classified food item for the caller.
#[instrument(skip(state, payload))]
pub async fn record_prediction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<PredictRequest>,
) -> Result<Reply<FoodLogEntry>, ApiError> {
    if user_id.trim().is_empty() {
        warn!("predict without caller identity");
        return Err(ApiError::AuthenticationMissing);
    }
    payload
        .validate()
        .map_err(|msg| ApiError::BadRequest(msg.into()))?;

    let entry = state
        .food_logs
        .record_entry(&user_id, payload.label.trim(), payload.calories)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "record food entry failed");
            ApiError::storage("Error writing to the food log", format!("{e:#}"))
        })?;

    info!(%user_id, entry_id = %entry.id, calories = entry.calories, "food entry recorded");
    Ok(created("Model is predicted successfully", entry))
}

/// GET /calories: daily, weekly and all-time calorie totals for the caller.
#[instrument(skip(state))]
pub async fn get_calories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Reply<CalorieReport>, ApiError> {
    let report = calorie_report(
        state.food_logs.as_ref(),
        &user_id,
        OffsetDateTime::now_utc(),
        &state.calories,
    )
    .await?;
    Ok(ok("Calories retrieved successfully", report))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};

    use crate::{
        auth::dto::{JwtKeys, TokenKind},
        food::{
            dto::MAX_ENTRY_CALORIES,
            repo::{FoodLogStore, MemoryFoodLogStore},
        },
        state::AppState,
        test_support::{bearer, send},
    };
    use axum::extract::FromRef;
    use sqlx::PgPool;

    fn get_calories(auth: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri("/api/v1/calories")
            .header(header::AUTHORIZATION, auth)
            .body(Body::empty())
            .unwrap()
    }

    fn post_predict(auth: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/predict")
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn calories_for_new_user_is_fourteen_zero_days() {
        let state = AppState::fake();
        let auth = bearer(&state, "user-1");
        let (status, body) = send(state, get_calories(&auth)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Calories retrieved successfully");
        let daily = body["data"]["dailyCalories"].as_object().expect("daily map");
        assert_eq!(daily.len(), 14);
        assert!(daily.values().all(|v| v == 0));
        assert_eq!(body["data"]["totalCalories"], 0);
    }

    #[tokio::test]
    async fn predicted_entries_show_up_in_calories() {
        let store = Arc::new(MemoryFoodLogStore::default());
        let state = AppState::fake_with_food_logs(store.clone() as Arc<dyn FoodLogStore>);
        let auth = bearer(&state, "user-1");

        let (status, body) = send(
            state.clone(),
            post_predict(&auth, json!({ "label": "sate ayam", "calories": 300 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["label"], "sate ayam");
        assert_eq!(body["data"]["calories"], 300);
        assert!(body["data"]["createdAt"].is_string());

        send(
            state.clone(),
            post_predict(&auth, json!({ "label": "es teh", "calories": 450 })),
        )
        .await;

        let (status, body) = send(state, get_calories(&auth)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalCalories"], 750);
        let daily = body["data"]["dailyCalories"].as_object().expect("daily map");
        let windowed: i64 = daily.values().filter_map(Value::as_i64).sum();
        assert_eq!(windowed, 750);
    }

    #[tokio::test]
    async fn empty_subject_is_a_bad_request_and_skips_store() {
        let store = Arc::new(MemoryFoodLogStore::default());
        let state = AppState::fake_with_food_logs(store.clone() as Arc<dyn FoodLogStore>);
        let auth = bearer(&state, "");

        let (status, body) = send(state, get_calories(&auth)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_a_server_error_with_detail() {
        let store = Arc::new(MemoryFoodLogStore::failing("firestore unavailable"));
        let state = AppState::fake_with_food_logs(store as Arc<dyn FoodLogStore>);
        let auth = bearer(&state, "user-1");

        let (status, body) = send(state, get_calories(&auth)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error retrieving calories");
        assert_eq!(body["error"], "firestore unavailable");
    }

    #[tokio::test]
    async fn calories_requires_a_token() {
        let req = Request::builder()
            .uri("/api/v1/calories")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(AppState::fake(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_token_cannot_read_calories() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_with_kind("user-1", TokenKind::Refresh)
            .unwrap();
        let (status, _) = send(state, get_calories(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn predict_rejects_negative_calories() {
        let state = AppState::fake();
        let auth = bearer(&state, "user-1");
        let (status, body) = send(
            state,
            post_predict(&auth, json!({ "label": "mystery", "calories": -5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "calories must not be negative");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn predict_and_calories_through_postgres(pool: PgPool) {
        let state = AppState::with_pool(pool);
        let auth = bearer(&state, "user-pg");

        for calories in [MAX_ENTRY_CALORIES, 250] {
            let (status, _) = send(
                state.clone(),
                post_predict(&auth, json!({ "label": "nasi goreng", "calories": calories })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let (status, _) = send(
            state.clone(),
            post_predict(&auth, json!({ "label": "too much", "calories": i64::MAX })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let other = bearer(&state, "someone-else");
        let (_, body) = send(state.clone(), get_calories(&other)).await;
        assert_eq!(body["data"]["totalCalories"], 0);

        let (status, body) = send(state, get_calories(&auth)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalCalories"], MAX_ENTRY_CALORIES + 250);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn oversized_rows_are_refused_by_the_table(pool: PgPool) {
        let res = sqlx::query(
            "INSERT INTO food_logs (id, user_id, label, calories) VALUES ($1, $2, $3, $4)",
        )
        .bind(uuid::Uuid::new_v4())
        .bind("user-pg")
        .bind("overflow")
        .bind(MAX_ENTRY_CALORIES + 1)
        .execute(&pool)
        .await;
        assert!(res.is_err());
    }
}

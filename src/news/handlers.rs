use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateNewsRequest, CreatedNews, NewsData, NewsList, UpdateNewsRequest},
    repo,
};
use crate::{
    auth::services::AuthUser,
    error::ApiError,
    response::{created, done, ok, Pagination, Reply},
    state::AppState,
};

pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(list_news).post(create_news))
        .route("/news/:id", get(get_news).put(update_news).delete(delete_news))
}

fn internal(context: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        error!(error = %e, "{context}");
        ApiError::storage(context, format!("{e:#}"))
    }
}

#[instrument(skip(state, payload))]
pub async fn create_news(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(payload): Json<CreateNewsRequest>,
) -> Result<Reply<CreatedNews>, ApiError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }

    let news = repo::insert(&state.db, title, &payload.content, payload.source.trim())
        .await
        .map_err(internal("Failed to add news"))?;

    info!(news_id = %news.id, "news added");
    Ok(created("News successfully added", CreatedNews { news_id: news.id }))
}

#[instrument(skip(state))]
pub async fn list_news(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Reply<NewsList>, ApiError> {
    let (limit, offset) = p.clamped();
    let news = repo::list(&state.db, limit, offset)
        .await
        .map_err(internal("Failed to fetch news"))?;
    Ok(ok("News retrieved successfully", NewsList { news }))
}

#[instrument(skip(state))]
pub async fn get_news(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Reply<NewsData>, ApiError> {
    let news = repo::get(&state.db, id)
        .await
        .map_err(internal("Failed to fetch news"))?
        .ok_or(ApiError::NotFound("News"))?;
    Ok(ok("News retrieved successfully", NewsData { news }))
}

#[instrument(skip(state, payload))]
pub async fn update_news(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNewsRequest>,
) -> Result<Reply<NewsData>, ApiError> {
    let title = payload.title.as_deref().map(str::trim);
    if title.is_some_and(str::is_empty) {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }

    let news = repo::update(
        &state.db,
        id,
        title,
        payload.content.as_deref(),
        payload.source.as_deref().map(str::trim),
    )
    .await
    .map_err(internal("Failed to update news"))?
    .ok_or(ApiError::NotFound("News"))?;

    info!(news_id = %news.id, "news updated");
    Ok(ok("News successfully updated", NewsData { news }))
}

#[instrument(skip(state))]
pub async fn delete_news(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Reply<()>, ApiError> {
    if !repo::delete(&state.db, id)
        .await
        .map_err(internal("Failed to delete news"))?
    {
        return Err(ApiError::NotFound("News"));
    }
    info!(news_id = %id, "news deleted");
    Ok(done("News successfully deleted"))
}

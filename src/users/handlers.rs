use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateUserRequest, CreatedUser, PublicUser, UpdateUserRequest, UserData, UserList},
    repo::{EmailTaken, User, UserChanges},
};
use crate::{
    auth::services::{check_password, hash_password, normalize_email, AuthUser},
    error::ApiError,
    response::{created, done, ok, Pagination, Reply},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn storage(context: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        error!(error = %e, "{context}");
        ApiError::storage(context, format!("{e:#}"))
    }
}

/// Like [`storage`], but a unique-email violation from the write is a 409.
fn write_failed(context: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        if e.downcast_ref::<EmailTaken>().is_some() {
            warn!("{context}: email already exists");
            return ApiError::Conflict("Email already exists".into());
        }
        storage(context)(e)
    }
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Reply<CreatedUser>, ApiError> {
    let email = normalize_email(&payload.email)?;
    check_password(&payload.password)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }

    if User::find_by_email(&state.db, &email)
        .await
        .map_err(storage("Failed to add user"))?
        .is_some()
    {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("Email already exists".into()));
    }

    let hash = hash_password(&payload.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    let user = User::create(&state.db, &email, &hash, name, payload.profile_url.as_deref())
        .await
        .map_err(write_failed("Failed to add user"))?;

    info!(user_id = %user.id, %email, "user added");
    Ok(created("User successfully added", CreatedUser { user_id: user.id }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Reply<UserList>, ApiError> {
    let (limit, offset) = p.clamped();
    let users = User::list(&state.db, limit, offset)
        .await
        .map_err(storage("Failed to fetch users"))?;
    let users = users.into_iter().map(PublicUser::from).collect();
    Ok(ok("Users retrieved successfully", UserList { users }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Reply<UserData>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await
        .map_err(storage("Failed to fetch user"))?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(ok("User retrieved successfully", UserData { user: user.into() }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Reply<UserData>, ApiError> {
    let email = payload.email.as_deref().map(normalize_email).transpose()?;
    let password_hash = match payload.password.as_deref() {
        Some(p) => {
            check_password(p)?;
            Some(hash_password(p).map_err(|e| ApiError::Internal(e.to_string()))?)
        }
        None => None,
    };

    if let Some(email) = &email {
        let taken = User::find_by_email(&state.db, email)
            .await
            .map_err(storage("Failed to update user"))?;
        if taken.is_some_and(|u| u.id != id) {
            return Err(ApiError::Conflict("Email already exists".into()));
        }
    }

    let changes = UserChanges {
        email,
        password_hash,
        name: payload.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        profile_url: payload.profile_url,
    };
    let user = User::update(&state.db, id, changes)
        .await
        .map_err(write_failed("Failed to update user"))?
        .ok_or(ApiError::NotFound("User"))?;

    info!(user_id = %user.id, "user updated");
    Ok(ok("User successfully updated", UserData { user: user.into() }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Reply<()>, ApiError> {
    if !User::delete(&state.db, id)
        .await
        .map_err(storage("Failed to delete user"))?
    {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = %id, "user deleted");
    Ok(done("User successfully deleted"))
}

use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
        services::{check_password, hash_password, normalize_email, verify_password, AuthUser, JwtKeys},
    },
    error::ApiError,
    response::{created, ok, Reply},
    state::AppState,
    users::{
        dto::PublicUser,
        repo::{EmailTaken, User},
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue(state: &AppState, user: User) -> Result<AuthResponse, ApiError> {
    let (access_token, refresh_token) = JwtKeys::from_ref(state).issue_pair(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e.to_string())
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Reply<AuthResponse>, ApiError> {
    let email = normalize_email(&payload.email)?;
    check_password(&payload.password)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }

    // Ensure email is not taken
    match User::find_by_email(&state.db, &email).await {
        Ok(Some(_)) => {
            warn!(%email, "email already registered");
            return Err(ApiError::Conflict("Email already registered".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::storage("Registration failed", format!("{e:#}")));
        }
    }

    let hash = hash_password(&payload.password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = User::create(&state.db, &email, &hash, name, payload.profile_url.as_deref())
        .await
        .map_err(|e| {
            if e.downcast_ref::<EmailTaken>().is_some() {
                warn!(%email, "email registered concurrently");
                return ApiError::Conflict("Email already registered".into());
            }
            error!(error = %e, "create user failed");
            ApiError::storage("Registration failed", format!("{e:#}"))
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(created("User successfully registered", issue(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Reply<AuthResponse>, ApiError> {
    let email = normalize_email(&payload.email)?;

    let user = match User::find_by_email(&state.db, &email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(%email, "login unknown email");
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::storage("Login failed", format!("{e:#}")));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal(e.to_string())
    })?;

    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(crate::response::ok("Login successful", issue(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Reply<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("User not found".into()))?;

    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| ApiError::storage("Refresh failed", format!("{e:#}")))?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(ok("Token refreshed", issue(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> Result<Reply<PublicUser>, ApiError> {
    if subject.is_empty() {
        return Err(ApiError::AuthenticationMissing);
    }
    let user_id = Uuid::parse_str(&subject)
        .map_err(|_| ApiError::Unauthorized("User not found".into()))?;
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "load user failed");
            ApiError::storage("Failed to fetch user", format!("{e:#}"))
        })?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(ok("User retrieved successfully", PublicUser::from(user)))
}

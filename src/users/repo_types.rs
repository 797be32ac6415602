use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                    // unique user ID
    pub email: String,               // lowercased, unique
    #[serde(skip_serializing)]
    pub password_hash: String,       // Argon2 hash, not exposed in JSON
    pub name: String,
    pub profile_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub profile_url: Option<String>,
}

/// A write collided with the unique index on `users.email`.
#[derive(Debug, thiserror::Error)]
#[error("email already exists")]
pub struct EmailTaken;

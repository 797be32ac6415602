use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

pub use super::repo_types::{EmailTaken, User, UserChanges};

const COLUMNS: &str = "id, email, password_hash, name, profile_url, created_at, updated_at";

/// Two concurrent writers can both pass the handler's email lookup; the index decides.
fn unique_email(e: sqlx::Error) -> anyhow::Error {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => EmailTaken.into(),
        other => other.into(),
    }
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("find user by id")?;
        Ok(user)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list users")?;
        Ok(users)
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        name: &str,
        profile_url: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, name, profile_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(profile_url)
        .fetch_one(db)
        .await
        .map_err(unique_email)
        .context("insert user")?;
        Ok(user)
    }

    /// Apply `changes` and bump `updated_at`. Returns `None` if the user does not exist.
    pub async fn update(db: &PgPool, id: Uuid, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET email         = COALESCE($2, email),
                   password_hash = COALESCE($3, password_hash),
                   name          = COALESCE($4, name),
                   profile_url   = COALESCE($5, profile_url),
                   updated_at    = now()
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.name)
        .bind(changes.profile_url)
        .fetch_optional(db)
        .await
        .map_err(unique_email)
        .context("update user")?;
        Ok(user)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }
}

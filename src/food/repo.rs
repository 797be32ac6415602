use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub use super::repo_types::FoodLogEntry;

/// Per-user, append-only food log.
#[async_trait]
pub trait FoodLogStore: Send + Sync {
    /// Every entry ever logged by `user_id`, newest first.
    async fn fetch_entries(&self, user_id: &str) -> anyhow::Result<Vec<FoodLogEntry>>;
    async fn record_entry(
        &self,
        user_id: &str,
        label: &str,
        calories: i64,
    ) -> anyhow::Result<FoodLogEntry>;
}

#[derive(Clone)]
pub struct PgFoodLogStore {
    db: PgPool,
}

impl PgFoodLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FoodLogStore for PgFoodLogStore {
    async fn fetch_entries(&self, user_id: &str) -> anyhow::Result<Vec<FoodLogEntry>> {
        let rows = sqlx::query_as::<_, FoodLogEntry>(
            r#"
            SELECT id, user_id, label, calories, created_at
              FROM food_logs
             WHERE user_id = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("fetch food log entries")?;
        Ok(rows)
    }

    async fn record_entry(
        &self,
        user_id: &str,
        label: &str,
        calories: i64,
    ) -> anyhow::Result<FoodLogEntry> {
        let entry = sqlx::query_as::<_, FoodLogEntry>(
            r#"
            INSERT INTO food_logs (id, user_id, label, calories)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, label, calories, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(label)
        .bind(calories)
        .fetch_one(&self.db)
        .await
        .context("insert food log entry")?;
        Ok(entry)
    }
}

#[cfg(test)]
pub use memory::MemoryFoodLogStore;

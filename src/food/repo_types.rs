use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One logged food item. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FoodLogEntry {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub label: String,
    pub calories: i64, // kcal, never negative
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

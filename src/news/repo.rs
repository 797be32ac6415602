use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub source: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn insert(db: &PgPool, title: &str, content: &str, source: &str) -> anyhow::Result<News> {
    let row = sqlx::query_as::<_, News>(
        r#"
        INSERT INTO news (id, title, content, source)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, content, source, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(content)
    .bind(source)
    .fetch_one(db)
    .await
    .context("insert news")?;
    Ok(row)
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<News>> {
    let rows = sqlx::query_as::<_, News>(
        r#"
        SELECT id, title, content, source, created_at, updated_at
          FROM news
         ORDER BY created_at DESC
         LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list news")?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<News>> {
    let row = sqlx::query_as::<_, News>(
        r#"
        SELECT id, title, content, source, created_at, updated_at
          FROM news
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("get news")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
    source: Option<&str>,
) -> anyhow::Result<Option<News>> {
    let row = sqlx::query_as::<_, News>(
        r#"
        UPDATE news
           SET title      = COALESCE($2, title),
               content    = COALESCE($3, content),
               source     = COALESCE($4, source),
               updated_at = now()
         WHERE id = $1
        RETURNING id, title, content, source, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .bind(source)
    .fetch_optional(db)
    .await
    .context("update news")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM news WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete news")?;
    Ok(res.rows_affected() > 0)
}

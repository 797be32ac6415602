use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::News;

#[derive(Debug, Deserialize)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateNewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNews {
    pub news_id: Uuid,
}

/// List and single-item replies both key their payload as `news`.
#[derive(Debug, Serialize)]
pub struct NewsList {
    pub news: Vec<News>,
}

#[derive(Debug, Serialize)]
pub struct NewsData {
    pub news: News,
}

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Success envelope shared by every resource route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Failure envelope, produced by `ApiError::into_response`.
#[derive(Debug, Serialize)]
pub struct FailBody {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Reply<T> {
    reply(StatusCode::OK, message, Some(data))
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Reply<T> {
    reply(StatusCode::CREATED, message, Some(data))
}

pub fn done(message: impl Into<String>) -> Reply<()> {
    reply(StatusCode::OK, message, None)
}

fn reply<T: Serialize>(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Reply<T> {
    (
        status,
        Json(ApiResponse {
            status: "success",
            message: message.into(),
            data,
        }),
    )
}

#[derive(Debug, serde::Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::response::FailBody;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("User ID is missing from authentication credentials")]
    AuthenticationMissing,

    /// The backing store failed; the message is passed through verbatim.
    #[error("{context}")]
    StorageUnavailable { context: String, message: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap a store failure with the user-facing context of the failed operation.
    pub fn storage(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ApiError::StorageUnavailable {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationMissing | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::StorageUnavailable { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::StorageUnavailable { message, .. } => Some(message.clone()),
            ApiError::Internal(message) => Some(message.clone()),
            _ => None,
        };
        if status.is_server_error() {
            error!(%status, error = ?detail, "{}", self);
        }

        let body = FailBody {
            status: "fail",
            message: self.to_string(),
            error: detail,
        };
        (status, Json(body)).into_response()
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(String),
    #[error("Not found")]
    NotFound,
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidPattern(msg) => {
                tracing::debug!(message = %msg, "Invalid pattern");
                (StatusCode::BAD_REQUEST, format!("Invalid regex pattern: {msg}"))
            }
            Self::NotFound => {
                tracing::debug!("Share not found");
                (StatusCode::NOT_FOUND, "Regex not found or expired".to_string())
            }
            Self::Io(e) => {
                tracing::error!(error = %e, "Storage I/O error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::Serialization(e) => {
                tracing::error!(error = %e, "Serialization error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// src/error.rs

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";
pub const LOCKED_MESSAGE: &str =
    "Question edits are locked currently. Disable EXAM_EDIT_LOCK to edit.";

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request: a question draft failed validation.
    Validation(String),

    // 401 Unauthorized: missing, expired or unknown token, or wrong credentials.
    AuthError(String),

    // 423 Locked: the exam edit lock is engaged.
    Locked,

    // 404 Not Found
    NotFound(String),

    // 503 Service Unavailable: the record store could not be reached.
    SourceUnavailable(String),
}

impl AppError {
    /// Uniform rejection for every failed token check.
    pub fn unauthorized() -> Self {
        AppError::AuthError(UNAUTHORIZED_MESSAGE.to_string())
    }

    /// Uniform rejection for a failed login, whichever half of the credential was wrong.
    pub fn invalid_credentials() -> Self {
        AppError::AuthError(INVALID_CREDENTIALS_MESSAGE.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Locked => StatusCode::LOCKED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg) => write!(f, "internal error: {}", msg),
            AppError::Validation(msg) => write!(f, "validation failed: {}", msg),
            AppError::AuthError(msg) => write!(f, "auth failed: {}", msg),
            AppError::Locked => f.write_str(LOCKED_MESSAGE),
            AppError::NotFound(msg) => write!(f, "not found: {}", msg),
            AppError::SourceUnavailable(msg) => write!(f, "record source unavailable: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::SourceUnavailable(msg) => {
                tracing::warn!("Record source unavailable: {}", msg);
                "Record source unavailable, retry later".to_string()
            }
            AppError::Locked => LOCKED_MESSAGE.to_string(),
            AppError::Validation(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg) => msg,
        };
        let body = Json(json!({
            "ok": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError`.
/// Connection-level failures are retryable by the caller; everything else is internal.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => AppError::SourceUnavailable(err.to_string()),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// A body that is not JSON, or not shaped like the DTO, is a validation failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

//! HTTP error types and mapping to status codes.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::error::NotekeeperError;

/// Errors surfaced to HTTP clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Note not found: {id}")]
    NotFound { id: Uuid },

    #[error("Validation failed for field '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Request cancelled: the server is shutting down")]
    Cancelled,

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ValidationFailed { .. } | ApiError::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::StorageError { .. } | ApiError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type name for the response body.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NotFound",
            ApiError::ValidationFailed { .. } => "ValidationFailed",
            ApiError::BadRequest { .. } => "BadRequest",
            ApiError::Cancelled => "Cancelled",
            ApiError::StorageError { .. } => "StorageError",
            ApiError::InternalError { .. } => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<NotekeeperError> for ApiError {
    fn from(err: NotekeeperError) -> Self {
        match err {
            NotekeeperError::NotFound(id) => ApiError::NotFound { id },
            NotekeeperError::Validation { field, message } => {
                ApiError::ValidationFailed { field, message }
            }
            NotekeeperError::Cancelled => ApiError::Cancelled,
            NotekeeperError::Storage(message) => ApiError::StorageError { message },
            NotekeeperError::Io(e) => ApiError::StorageError {
                message: format!("IO error: {}", e),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

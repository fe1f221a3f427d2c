// Request-boundary error taxonomy and its HTTP mapping.
// Store detail is logged server-side, never returned to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::student::FieldError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed name or marks; surfaced as 400 with per-field messages.
    /// Never reaches the store.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// The target record does not exist.
    #[error("student not found")]
    NotFound,

    /// Store connectivity failure, malformed identifier, or constraint
    /// violation; surfaced as a generic 500.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Student not found" })),
            )
                .into_response(),
            ApiError::Store(err) => {
                tracing::error!("store error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Server error" })),
                )
                    .into_response()
            }
        }
    }
}

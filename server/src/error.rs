//! Application Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bo_common::AccessError;
use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced by route handlers and permission middleware.
#[derive(Debug, Error)]
pub enum AppError {
    /// The current user lacks required permissions.
    #[error(transparent)]
    Forbidden(#[from] AccessError),

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A session value could not be encoded.
    #[error("Session encoding failed: {0}")]
    Session(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Forbidden(err) => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
            Self::Backend(BackendError::Status { status: 404, message }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
            }
            Self::Backend(BackendError::Status { status: 409, message }) => {
                (StatusCode::CONFLICT, "CONFLICT", message.clone())
            }
            Self::Backend(BackendError::Status { status: 403, message }) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", message.clone())
            }
            Self::Backend(err) if err.is_unauthorized() => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Backend session is no longer valid".to_string(),
            ),
            Self::Backend(err) => {
                tracing::error!(error = %err, "Backend call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_ERROR",
                    "Backend service unavailable".to_string(),
                )
            }
            Self::Session(err) => {
                tracing::error!(error = %err, "Session encoding failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = match &self {
            Self::Forbidden(AccessError::MissingPermissions { missing }) => serde_json::json!({
                "error": code,
                "message": message,
                "missing": missing,
            }),
            _ => serde_json::json!({ "error": code, "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type AppResult<T> = Result<T, AppError>;

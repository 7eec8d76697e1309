//! Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use super::identity::GateRedirect;
use crate::backend::BackendError;
use crate::error::AppError;

/// Outcomes of the authentication middleware other than "continue".
#[derive(Debug, Error)]
pub enum AuthError {
    /// No identity in the session; answered with a redirect.
    #[error("Authentication required")]
    Unauthenticated(GateRedirect),

    /// A handler asked for the current user on a route without `require_auth`.
    #[error("Current user not available")]
    MissingUser,

    /// Loading the user from the backend failed.
    #[error("Backend error")]
    Backend(#[from] BackendError),

    /// Session value could not be encoded.
    #[error("Session encoding failed")]
    Session(#[from] serde_json::Error),
}

impl From<GateRedirect> for AuthError {
    fn from(redirect: GateRedirect) -> Self {
        Self::Unauthenticated(redirect)
    }
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(redirect) => redirect.into_response(),
            Self::MissingUser => {
                let body = Json(ErrorResponse {
                    error: "UNAUTHENTICATED".to_string(),
                    message: self.to_string(),
                });
                (StatusCode::UNAUTHORIZED, body).into_response()
            }
            Self::Backend(err) => AppError::Backend(err).into_response(),
            Self::Session(err) => AppError::Session(err).into_response(),
        }
    }
}

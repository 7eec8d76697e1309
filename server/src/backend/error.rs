//! Backend Client Error Types

use thiserror::Error;

/// Errors returned by backend API calls.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure or undecodable body.
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the backend error body, or the status reason.
        message: String,
    },

    /// No usable access token and no auth session to refresh one from.
    #[error("No backend access token available")]
    MissingToken,
}

impl BackendError {
    /// HTTP status returned by the backend, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the caller's credentials or token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401)) || matches!(self, Self::MissingToken)
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

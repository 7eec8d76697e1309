//! Error Types

use thiserror::Error;

/// Errors raised while parsing shared configuration or catalog values.
#[derive(Debug, Error)]
pub enum Error {
    /// A permission code that is not part of the catalog.
    #[error("Unknown permission code: {0}")]
    UnknownPermission(String),

    /// Navigation configuration could not be decoded.
    #[error("Invalid navigation configuration: {0}")]
    InvalidNavigation(#[from] serde_json::Error),
}

/// Result alias for shared operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Authorization failure for an explicit permission requirement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The user lacks one or more required permission codes.
    ///
    /// In `Any` mode `missing` lists every required code, since none was held.
    #[error("Missing required permissions: {}", .missing.join(", "))]
    MissingPermissions {
        /// Codes that were required but not granted.
        missing: Vec<String>,
    },
}

//! Backend API Client
//!
//! HTTP client for the identity service (login, token refresh, user lookup)
//! and the role-management API. Calls that need a bearer token go through a
//! [`ScopedBackendClient`] bound to the caller's [`TokenContext`].

mod client;
mod error;
mod token;
mod types;

pub use client::{BackendClient, ScopedBackendClient};
pub use error::{BackendError, BackendResult};
pub use token::{AccessToken, TokenContext, ACCESS_TOKEN_KEY};
pub use types::{LoginResponse, Role};

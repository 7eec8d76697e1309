//! Authentication
//!
//! Session-based sign-in, identity resolution, and the route gate that
//! protects everything behind it.

mod error;
mod handlers;
mod identity;
mod middleware;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use error::AuthError;
pub use handlers::{LoginPage, LoginRequest, INVALID_CREDENTIALS_MESSAGE};
pub use identity::{
    clear_identity, get_identity, require_identity, store_identity, GateRedirect,
    RequireIdentityOptions,
};
pub use middleware::{require_auth, CurrentUser, SESSION_EXPIRED_MESSAGE, SIGN_IN_MESSAGE};

/// Create authentication router.
///
/// Public routes:
/// - GET /login - Login page state (consumes flash)
/// - POST /login - Sign in with email/password
/// - POST /logout - Sign out and destroy the session
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", post(handlers::logout))
}

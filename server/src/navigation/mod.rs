//! Navigation
//!
//! The static navigation tree and the endpoint serving it, filtered for the
//! current user.

mod config;
mod handlers;

use axum::{routing::get, Router};

use crate::api::AppState;

pub use config::{default_navigation, load_navigation};
pub use handlers::get_navigation;

/// Create the navigation router (mounted behind `require_auth`).
///
/// - GET /navigation - Navigation tree filtered by the user's permissions
pub fn router() -> Router<AppState> {
    Router::new().route("/navigation", get(handlers::get_navigation))
}

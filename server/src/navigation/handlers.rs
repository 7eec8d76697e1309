//! Navigation HTTP Handlers

use axum::extract::State;
use axum::Json;
use bo_common::{filter_nav_items, NavItem};

use crate::api::AppState;
use crate::auth::CurrentUser;

/// Get the navigation tree visible to the current user.
///
/// GET /api/navigation
pub async fn get_navigation(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Json<Vec<NavItem>> {
    Json(filter_nav_items(&state.navigation, &current.permissions))
}

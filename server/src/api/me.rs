//! Current user endpoints.

use axum::extract::State;
use axum::Json;
use bo_common::{filter_nav_items, NavItem, User};
use serde::Serialize;

use super::AppState;
use crate::auth::CurrentUser;

/// Landing page state.
#[derive(Debug, Serialize)]
pub struct HomePage {
    pub user: User,
    pub navigation: Vec<NavItem>,
}

/// Current user with normalized permission codes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub employee_id: uuid::Uuid,
    pub permission_codes: Vec<String>,
}

/// Landing page for signed-in users.
///
/// GET /
pub async fn home(State(state): State<AppState>, current: CurrentUser) -> Json<HomePage> {
    let navigation = filter_nav_items(&state.navigation, &current.permissions);
    Json(HomePage {
        user: current.user,
        navigation,
    })
}

/// Get the current user.
///
/// GET /api/me
pub async fn get_me(current: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        permission_codes: current.permissions.sorted_codes(),
        employee_id: current.identity.employee_id,
        user: current.user,
    })
}

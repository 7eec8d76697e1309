//! Role activation endpoints.
//!
//! Permission checks happen in the route layers; these handlers only forward
//! to the identity service with the user's token.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use super::AppState;
use crate::auth::CurrentUser;
use crate::backend::Role;
use crate::error::AppResult;

/// Activate a role.
///
/// POST /api/roles/{id}/activate
#[tracing::instrument(skip(state, current), fields(user_id = %current.identity.user_id))]
pub async fn activate_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<Role>> {
    let role = current.backend(&state).activate_role(role_id).await?;
    tracing::info!(%role_id, "Role activated");
    Ok(Json(role))
}

/// Deactivate a role.
///
/// POST /api/roles/{id}/deactivate
#[tracing::instrument(skip(state, current), fields(user_id = %current.identity.user_id))]
pub async fn deactivate_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<Role>> {
    let role = current.backend(&state).deactivate_role(role_id).await?;
    tracing::info!(%role_id, "Role deactivated");
    Ok(Json(role))
}

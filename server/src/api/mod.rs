//! API Router and Application State
//!
//! Central routing configuration and shared state.

mod me;
mod roles;

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::Key;
use bo_common::{NavItem, Permission};
use serde::Serialize;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    auth,
    backend::BackendClient,
    config::Config,
    navigation,
    permissions::require_permission,
    session::SessionStorage,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Server-side session records
    pub sessions: SessionStorage,
    /// Identity service client
    pub backend: BackendClient,
    /// Unfiltered navigation tree
    pub navigation: Arc<[NavItem]>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        config: Config,
        sessions: SessionStorage,
        backend: BackendClient,
        navigation: Vec<NavItem>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            backend,
            navigation: navigation.into(),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.key().clone()
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let role_routes = Router::new()
        .route(
            "/{id}/activate",
            post(roles::activate_role).layer(from_fn(require_permission(Permission::RoleActivate))),
        )
        .route(
            "/{id}/deactivate",
            post(roles::deactivate_role)
                .layer(from_fn(require_permission(Permission::RoleDeactivate))),
        );

    // Everything here sits behind the identity gate
    let protected_routes = Router::new()
        .route("/", get(me::home))
        .route("/api/me", get(me::get_me))
        .nest("/api", navigation::router())
        .nest("/api/roles", role_routes)
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Login/logout
        .merge(auth::router())
        .merge(protected_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Live server-side sessions
    sessions: usize,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.sessions.len(),
    })
}

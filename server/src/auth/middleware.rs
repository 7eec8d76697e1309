//! Authentication Middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use bo_common::{Identity, PermissionSet, User};

use super::error::AuthError;
use super::identity::{clear_identity, require_identity, GateRedirect, RequireIdentityOptions};
use crate::api::AppState;
use crate::backend::{AccessToken, ScopedBackendClient, TokenContext, ACCESS_TOKEN_KEY};
use crate::session::FLASH_MESSAGE_KEY;

/// Flash shown on the login page after the gate redirects there.
pub const SIGN_IN_MESSAGE: &str = "Please sign in to continue";

/// Flash shown when the backend no longer accepts the session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, please sign in again";

/// Authenticated user injected into request extensions.
///
/// Built once per request from the session identity and the backend user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Identity from the session.
    pub identity: Identity,
    /// User snapshot from the identity service.
    pub user: User,
    /// Granted codes, normalized.
    pub permissions: PermissionSet,
    /// Backend token cache for this session.
    pub tokens: TokenContext,
}

impl CurrentUser {
    /// Backend client authenticated as this user.
    #[must_use]
    pub fn backend(&self, state: &AppState) -> ScopedBackendClient {
        state.backend.with_context(self.tokens.clone())
    }
}

/// Middleware to require an authenticated session.
///
/// Resolves the identity from the session cookie, loads the user from the
/// backend, and injects [`CurrentUser`] into request extensions. Requests
/// without an identity are redirected to the login page with a flash
/// message. If the backend refreshed the API token while serving the
/// request, the session is re-committed with the new token.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, require_auth))
/// ```
#[tracing::instrument(skip_all)]
pub async fn require_auth(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let mut session = state.sessions.get_session(&jar);
    let gate = RequireIdentityOptions::redirect_to(state.config.login_path.clone())
        .with_flash(SIGN_IN_MESSAGE);
    let identity = require_identity(&state.sessions, &jar, &mut session, &gate)?;

    let tokens = TokenContext::new(
        identity.auth_session_id.clone(),
        session.get::<AccessToken>(ACCESS_TOKEN_KEY),
    );

    let user = match state
        .backend
        .with_context(tokens.clone())
        .fetch_user(identity.user_id)
        .await
    {
        Ok(user) => user,
        Err(err) if err.is_unauthorized() => {
            tracing::info!(user_id = %identity.user_id, "Backend rejected session, signing out");
            clear_identity(&mut session);
            session.unset(ACCESS_TOKEN_KEY);
            session.flash(FLASH_MESSAGE_KEY, SESSION_EXPIRED_MESSAGE);
            let jar = state.sessions.commit_session(jar, session);
            return Err(GateRedirect::new(state.config.login_path.clone(), Some(jar)).into());
        }
        Err(err) => return Err(err.into()),
    };

    let permissions = PermissionSet::from_user(&user);
    tracing::debug!(
        user_id = %identity.user_id,
        permissions = permissions.len(),
        "Request authenticated"
    );

    request.extensions_mut().insert(CurrentUser {
        identity,
        user,
        permissions,
        tokens: tokens.clone(),
    });

    let response = next.run(request).await;

    if let Some(token) = tokens.take_refreshed().await {
        session.set_json(ACCESS_TOKEN_KEY, &token)?;
        let jar = state.sessions.commit_session(jar, session);
        return Ok((jar, response).into_response());
    }

    Ok(response)
}

/// Extractor for the authenticated user in handlers behind [`require_auth`].
///
/// ```ignore
/// async fn handler(current: CurrentUser) -> impl IntoResponse {
///     Json(current.user)
/// }
/// ```
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingUser)
    }
}

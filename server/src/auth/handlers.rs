//! Authentication HTTP Handlers

use axum::extract::State;
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};

use super::identity::{clear_identity, get_identity, store_identity};
use crate::api::AppState;
use crate::backend::ACCESS_TOKEN_KEY;
use crate::error::AppResult;
use crate::session::FLASH_MESSAGE_KEY;

/// Flash shown after rejected credentials.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Path to return to after signing in.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Login page state.
#[derive(Debug, Serialize)]
pub struct LoginPage {
    /// One-shot message left by a previous redirect.
    pub flash: Option<String>,
}

/// Only same-origin absolute paths are accepted as post-login targets.
fn safe_redirect_target(target: Option<&str>) -> &str {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// Show the login page.
///
/// GET /login
///
/// Consumes any pending flash message. Signed-in users are sent home.
pub async fn login_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<LoginPage>), Redirect> {
    let mut session = state.sessions.get_session(&jar);

    if get_identity(&session).is_some() {
        return Err(Redirect::to("/"));
    }

    let flash = session.take_flash::<String>(FLASH_MESSAGE_KEY);
    let jar = state.sessions.commit_session(jar, session);

    Ok((jar, Json(LoginPage { flash })))
}

/// Sign in with email and password.
///
/// POST /login
#[tracing::instrument(skip(state, jar, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let mut session = state.sessions.get_session(&jar);

    match state.backend.login(&body.email, &body.password).await {
        Ok(login) => {
            // Never carry a pre-login session ID across sign-in.
            let mut session = state.sessions.regenerate(session);
            store_identity(&mut session, &login.identity());
            session.set_json(ACCESS_TOKEN_KEY, &login.token())?;
            tracing::info!(user_id = %login.user_id, "User signed in");

            let target = safe_redirect_target(body.redirect_to.as_deref()).to_string();
            let jar = state.sessions.commit_session(jar, session);
            Ok((jar, Redirect::to(&target)))
        }
        Err(err) if matches!(err.status(), Some(400 | 401 | 403)) => {
            tracing::info!("Sign-in rejected");
            clear_identity(&mut session);
            session.flash(FLASH_MESSAGE_KEY, INVALID_CREDENTIALS_MESSAGE);

            let jar = state.sessions.commit_session(jar, session);
            Ok((jar, Redirect::to(&state.config.login_path)))
        }
        Err(err) => Err(err.into()),
    }
}

/// Sign out.
///
/// POST /logout
///
/// Revoking the backend session is best effort; the local session is always
/// destroyed.
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Redirect) {
    let session = state.sessions.get_session(&jar);

    if let Some(identity) = get_identity(&session) {
        if let Some(auth_session_id) = identity.auth_session_id.as_deref() {
            if let Err(err) = state.backend.logout(auth_session_id).await {
                tracing::warn!(error = %err, "Failed to revoke backend session");
            }
        }
        tracing::info!(user_id = %identity.user_id, "User signed out");
    }

    let jar = state.sessions.destroy_session(jar, session);
    (jar, Redirect::to(&state.config.login_path))
}

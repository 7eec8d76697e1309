//! Identity resolution and the route gate.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use bo_common::Identity;
use uuid::Uuid;

use crate::session::{Session, SessionStorage, FLASH_MESSAGE_KEY};

/// Resolve the identity stored in a session.
///
/// Returns `None` unless both the user ID and employee ID are present.
pub fn get_identity(session: &Session) -> Option<Identity> {
    let user_id = session.get::<Uuid>(Identity::USER_ID_KEY)?;
    let employee_id = session.get::<Uuid>(Identity::EMPLOYEE_ID_KEY)?;

    Some(Identity {
        user_id,
        employee_id,
        auth_session_id: session.get(Identity::AUTH_SESSION_ID_KEY),
    })
}

/// Write an identity into a session.
pub fn store_identity(session: &mut Session, identity: &Identity) {
    session.set(Identity::USER_ID_KEY, identity.user_id.to_string());
    session.set(Identity::EMPLOYEE_ID_KEY, identity.employee_id.to_string());
    match &identity.auth_session_id {
        Some(id) => session.set(Identity::AUTH_SESSION_ID_KEY, id.clone()),
        None => session.unset(Identity::AUTH_SESSION_ID_KEY),
    }
}

/// Remove every identity key from a session.
pub fn clear_identity(session: &mut Session) {
    session.unset(Identity::USER_ID_KEY);
    session.unset(Identity::EMPLOYEE_ID_KEY);
    session.unset(Identity::AUTH_SESSION_ID_KEY);
}

/// Where to send unauthenticated requests, and what to tell them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireIdentityOptions {
    /// Redirect target. Defaults to `/`.
    pub redirect_to: String,
    /// Flash message stored before redirecting.
    pub flash: Option<String>,
}

impl Default for RequireIdentityOptions {
    fn default() -> Self {
        Self {
            redirect_to: "/".to_string(),
            flash: None,
        }
    }
}

impl RequireIdentityOptions {
    /// Redirect to `path` without a flash message.
    pub fn redirect_to(path: impl Into<String>) -> Self {
        Self {
            redirect_to: path.into(),
            flash: None,
        }
    }

    #[must_use]
    pub fn with_flash(mut self, message: impl Into<String>) -> Self {
        self.flash = Some(message.into());
        self
    }
}

/// Redirect issued by the gate when no identity is present.
///
/// This is the normal unauthenticated outcome rather than an error: handlers
/// return it with `?` and the client follows the redirect.
#[derive(Debug, Clone)]
pub struct GateRedirect {
    location: String,
    jar: Option<SignedCookieJar>,
}

impl GateRedirect {
    /// Redirect to `location`, optionally sending the cookies in `jar`.
    #[must_use]
    pub fn new(location: String, jar: Option<SignedCookieJar>) -> Self {
        Self { location, jar }
    }

    /// Redirect target.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Cookies sent with the redirect, if the session was committed.
    #[must_use]
    pub const fn jar(&self) -> Option<&SignedCookieJar> {
        self.jar.as_ref()
    }
}

impl IntoResponse for GateRedirect {
    fn into_response(self) -> Response {
        let redirect = Redirect::to(&self.location);
        match self.jar {
            Some(jar) => (jar, redirect).into_response(),
            None => redirect.into_response(),
        }
    }
}

/// Require an identity, or redirect.
///
/// On failure the optional flash message is stored in the session, the
/// session is committed against `jar`, and the returned [`GateRedirect`]
/// carries the resulting cookies.
pub fn require_identity(
    storage: &SessionStorage,
    jar: &SignedCookieJar,
    session: &mut Session,
    opts: &RequireIdentityOptions,
) -> Result<Identity, GateRedirect> {
    if let Some(identity) = get_identity(session) {
        return Ok(identity);
    }

    tracing::debug!(redirect_to = %opts.redirect_to, "No identity in session, redirecting");

    let jar = opts.flash.as_ref().map(|message| {
        session.flash(FLASH_MESSAGE_KEY, message.clone());
        storage.commit_session(jar.clone(), session.clone())
    });

    Err(GateRedirect::new(opts.redirect_to.clone(), jar))
}

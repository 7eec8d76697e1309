//! Backend access tokens and the per-session token context.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Session key holding the backend [`AccessToken`].
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Short-lived bearer token for the backend API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Bearer token value.
    pub token: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Whether the token expires within `skew` of `now`.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.expires_at - skew <= now
    }
}

#[derive(Debug, Default)]
struct TokenState {
    auth_session_id: Option<String>,
    token: Option<AccessToken>,
    refreshed: bool,
}

/// Token cache scoped to one session.
///
/// Built from the session at the start of a request and handed to
/// [`BackendClient::with_context`](super::BackendClient::with_context). Clones
/// share state, so a refresh made while serving the request is visible to the
/// middleware that writes it back into the session.
#[derive(Debug, Clone, Default)]
pub struct TokenContext {
    inner: Arc<Mutex<TokenState>>,
}

impl TokenContext {
    /// Create a context for a backend auth session with an optional cached token.
    #[must_use]
    pub fn new(auth_session_id: Option<String>, token: Option<AccessToken>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TokenState {
                auth_session_id,
                token,
                refreshed: false,
            })),
        }
    }

    /// Currently cached token, stale or not.
    pub async fn current(&self) -> Option<AccessToken> {
        self.inner.lock().await.token.clone()
    }

    /// If the token was refreshed since the last call, return it and clear the flag.
    pub async fn take_refreshed(&self) -> Option<AccessToken> {
        let mut state = self.inner.lock().await;
        if !state.refreshed {
            return None;
        }
        state.refreshed = false;
        state.token.clone()
    }

    /// Return a fresh token value, refreshing through `refresh` when the cached
    /// one is missing or stale.
    ///
    /// The lock is held across the refresh so concurrent callers sharing the
    /// context refresh at most once.
    pub(super) async fn bearer_with<F, Fut, E>(
        &self,
        skew: Duration,
        refresh: F,
    ) -> Result<String, E>
    where
        F: FnOnce(Option<String>) -> Fut,
        Fut: std::future::Future<Output = Result<AccessToken, E>>,
    {
        let mut state = self.inner.lock().await;

        if let Some(token) = &state.token {
            if !token.is_stale(Utc::now(), skew) {
                return Ok(token.token.clone());
            }
        }

        let fresh = refresh(state.auth_session_id.clone()).await?;
        let value = fresh.token.clone();
        state.token = Some(fresh);
        state.refreshed = true;

        tracing::debug!("Backend access token refreshed");
        Ok(value)
    }
}

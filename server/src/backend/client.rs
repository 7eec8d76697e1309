//! Backend HTTP client.

use std::sync::Arc;

use bo_common::User;
use chrono::Duration;
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::instrument;
use uuid::Uuid;

use super::error::{BackendError, BackendResult};
use super::token::{AccessToken, TokenContext};
use super::types::{ErrorBody, LoginRequest, LoginResponse, Role};
use crate::config::Config;

/// Unauthenticated client for the backend API.
///
/// Cheap to clone. Token-bearing calls are made through
/// [`with_context`](Self::with_context).
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    token_expiry_skew: Duration,
}

impl BackendClient {
    /// Create a client for the backend named in `config`.
    pub fn new(config: &Config) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bo-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::from(config.backend_url.trim_end_matches('/')),
            token_expiry_skew: Duration::seconds(config.token_expiry_skew),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Bind the client to a session's token context.
    #[must_use]
    pub fn with_context(&self, context: TokenContext) -> ScopedBackendClient {
        ScopedBackendClient {
            client: self.clone(),
            context,
        }
    }

    /// Exchange credentials for an auth session and first access token.
    ///
    /// POST /auth/login
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> BackendResult<LoginResponse> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        decode(response).await
    }

    /// Mint a new access token for an auth session.
    ///
    /// POST /auth/sessions/{id}/token
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, auth_session_id: &str) -> BackendResult<AccessToken> {
        let response = self
            .http
            .post(self.url(&format!("/auth/sessions/{auth_session_id}/token")))
            .send()
            .await?;

        decode(response).await
    }

    /// Revoke an auth session.
    ///
    /// DELETE /auth/sessions/{id}
    #[instrument(skip_all)]
    pub async fn logout(&self, auth_session_id: &str) -> BackendResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/auth/sessions/{auth_session_id}")))
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }
}

/// Backend client bound to one session's [`TokenContext`].
#[derive(Debug, Clone)]
pub struct ScopedBackendClient {
    client: BackendClient,
    context: TokenContext,
}

impl ScopedBackendClient {
    async fn bearer(&self) -> BackendResult<String> {
        self.context
            .bearer_with(self.client.token_expiry_skew, |auth_session_id| async move {
                let auth_session_id = auth_session_id.ok_or(BackendError::MissingToken)?;
                self.client.refresh_token(&auth_session_id).await
            })
            .await
    }

    /// Fetch a user with their granted permissions.
    ///
    /// GET /users/{id}
    #[instrument(skip(self))]
    pub async fn fetch_user(&self, user_id: Uuid) -> BackendResult<User> {
        let token = self.bearer().await?;
        let response = self
            .client
            .http
            .get(self.client.url(&format!("/users/{user_id}")))
            .bearer_auth(token)
            .send()
            .await?;

        decode(response).await
    }

    /// Activate a role.
    ///
    /// POST /roles/{id}/activate
    #[instrument(skip(self))]
    pub async fn activate_role(&self, role_id: Uuid) -> BackendResult<Role> {
        self.post_role_action(role_id, "activate").await
    }

    /// Deactivate a role.
    ///
    /// POST /roles/{id}/deactivate
    #[instrument(skip(self))]
    pub async fn deactivate_role(&self, role_id: Uuid) -> BackendResult<Role> {
        self.post_role_action(role_id, "deactivate").await
    }

    async fn post_role_action(&self, role_id: Uuid, action: &str) -> BackendResult<Role> {
        let token = self.bearer().await?;
        let response = self
            .client
            .http
            .post(self.client.url(&format!("/roles/{role_id}/{action}")))
            .bearer_auth(token)
            .send()
            .await?;

        decode(response).await
    }
}

async fn check_status(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = status.canonical_reason().unwrap_or("Unknown status").to_string();
    let message = response
        .json::<ErrorBody>()
        .await
        .map_or(reason, |body| body.message);

    tracing::debug!(status = status.as_u16(), %message, "Backend request rejected");
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    Ok(check_status(response).await?.json().await?)
}

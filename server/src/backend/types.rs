//! Backend API payloads.

use bo_common::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token::AccessToken;

/// Successful login answer from the identity service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub employee_id: Uuid,
    pub auth_session_id: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl LoginResponse {
    /// Identity to store in the session.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            employee_id: self.employee_id,
            auth_session_id: Some(self.auth_session_id.clone()),
        }
    }

    /// Initial backend access token.
    #[must_use]
    pub fn token(&self) -> AccessToken {
        AccessToken {
            token: self.access_token.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Role as returned by the role-management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Serialize)]
pub(super) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(super) struct ErrorBody {
    pub message: String,
}

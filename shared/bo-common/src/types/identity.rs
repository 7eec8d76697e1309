//! Identity Types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal authenticated-user reference stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Identity-service user ID.
    pub user_id: Uuid,
    /// HR employee ID linked to the user.
    pub employee_id: Uuid,
    /// Backend auth session, used to refresh API tokens and to log out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_session_id: Option<String>,
}

impl Identity {
    /// Session key holding the user ID.
    pub const USER_ID_KEY: &'static str = "userId";
    /// Session key holding the employee ID.
    pub const EMPLOYEE_ID_KEY: &'static str = "employeeId";
    /// Session key holding the backend auth session ID.
    pub const AUTH_SESSION_ID_KEY: &'static str = "authSessionId";
}

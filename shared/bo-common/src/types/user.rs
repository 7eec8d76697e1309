//! User Types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A permission granted to a user, as returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantedPermission {
    /// Catalog code (e.g. `ROLE_VIEW`).
    pub code: String,
    /// Display label.
    pub name: String,
    /// Longer description, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GrantedPermission {
    /// Create a grant with no description.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
        }
    }
}

/// Authenticated user snapshot.
///
/// Fetched once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: Uuid,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Granted permissions, in backend order.
    #[serde(default)]
    pub permissions: Vec<GrantedPermission>,
}

//! Permission helper functions for API handlers.
//!
//! Convenience checks on the [`CurrentUser`] injected by `require_auth`.

use bo_common::{has_permissions, AccessError, PermissionMode};

use crate::auth::CurrentUser;

impl CurrentUser {
    /// Check `required` against the user's permissions.
    #[must_use]
    pub fn has_permissions<S: AsRef<str>>(&self, required: &[S], mode: PermissionMode) -> bool {
        has_permissions(&self.permissions, required, mode)
    }

    /// Check a single permission code.
    #[must_use]
    pub fn has_permission(&self, code: impl AsRef<str>) -> bool {
        self.permissions.contains(code.as_ref())
    }

    /// Require `required`, returning `Err(AccessError::MissingPermissions)` on failure.
    pub fn require_permissions<S: AsRef<str>>(
        &self,
        required: &[S],
        mode: PermissionMode,
    ) -> Result<(), AccessError> {
        self.permissions.require(required, mode)
    }
}

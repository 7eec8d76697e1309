//! Permission catalog, permission sets and the authorization evaluator.
//!
//! Permission codes are opaque strings. The [`Permission`] enum is the closed
//! catalog the backend hands out, but evaluation only ever compares code
//! strings, so codes unknown to this build still flow through unchanged.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{AccessError, Error};
use crate::types::User;

/// Permission codes known to the backoffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// List and inspect user accounts
    UserView,
    /// Create user accounts
    UserCreate,
    /// Edit user accounts
    UserUpdate,
    /// List and inspect roles
    RoleView,
    /// Create roles
    RoleCreate,
    /// Edit roles and their permission grants
    RoleUpdate,
    /// Re-activate a deactivated role
    RoleActivate,
    /// Deactivate a role
    RoleDeactivate,
    /// Browse the permission catalog
    PermissionView,
    /// List and inspect employees
    EmployeeView,
    /// Hire (create) employees
    EmployeeCreate,
    /// Edit employee records
    EmployeeUpdate,
    /// List positions
    PositionView,
    /// Create and edit positions
    PositionManage,
    /// List departments
    DepartmentView,
    /// List Scrum projects
    ProjectView,
    /// Create and edit Scrum projects
    ProjectManage,
    /// View sprints
    SprintView,
    /// Plan, start and close sprints
    SprintManage,
    /// View product backlogs
    BacklogView,
    /// Create and edit tasks
    TaskManage,
}

impl Permission {
    /// Returns the wire code for this permission.
    ///
    /// # Examples
    ///
    /// ```
    /// use bo_common::Permission;
    ///
    /// assert_eq!(Permission::RoleDeactivate.code(), "ROLE_DEACTIVATE");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UserView => "USER_VIEW",
            Self::UserCreate => "USER_CREATE",
            Self::UserUpdate => "USER_UPDATE",
            Self::RoleView => "ROLE_VIEW",
            Self::RoleCreate => "ROLE_CREATE",
            Self::RoleUpdate => "ROLE_UPDATE",
            Self::RoleActivate => "ROLE_ACTIVATE",
            Self::RoleDeactivate => "ROLE_DEACTIVATE",
            Self::PermissionView => "PERMISSION_VIEW",
            Self::EmployeeView => "EMPLOYEE_VIEW",
            Self::EmployeeCreate => "EMPLOYEE_CREATE",
            Self::EmployeeUpdate => "EMPLOYEE_UPDATE",
            Self::PositionView => "POSITION_VIEW",
            Self::PositionManage => "POSITION_MANAGE",
            Self::DepartmentView => "DEPARTMENT_VIEW",
            Self::ProjectView => "PROJECT_VIEW",
            Self::ProjectManage => "PROJECT_MANAGE",
            Self::SprintView => "SPRINT_VIEW",
            Self::SprintManage => "SPRINT_MANAGE",
            Self::BacklogView => "BACKLOG_VIEW",
            Self::TaskManage => "TASK_MANAGE",
        }
    }

    /// Returns every catalog entry.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::UserView,
            Self::UserCreate,
            Self::UserUpdate,
            Self::RoleView,
            Self::RoleCreate,
            Self::RoleUpdate,
            Self::RoleActivate,
            Self::RoleDeactivate,
            Self::PermissionView,
            Self::EmployeeView,
            Self::EmployeeCreate,
            Self::EmployeeUpdate,
            Self::PositionView,
            Self::PositionManage,
            Self::DepartmentView,
            Self::ProjectView,
            Self::ProjectManage,
            Self::SprintView,
            Self::SprintManage,
            Self::BacklogView,
            Self::TaskManage,
        ]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.code() == s)
            .ok_or_else(|| Error::UnknownPermission(s.to_string()))
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.code()
    }
}

/// How a list of required codes is matched against a [`PermissionSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Every required code must be held.
    #[default]
    All,
    /// At least one required code must be held.
    Any,
}

/// The set of permission codes held by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    codes: HashSet<SmolStr>,
}

impl PermissionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from a user's granted permissions.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        user.permissions.iter().map(|p| p.code.as_str()).collect()
    }

    /// Check whether a single code is held.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Add a code to the set.
    pub fn insert(&mut self, code: impl Into<SmolStr>) {
        self.codes.insert(code.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Held codes in lexicographic order.
    #[must_use]
    pub fn sorted_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.codes.iter().map(ToString::to_string).collect();
        codes.sort_unstable();
        codes
    }

    /// Require `required` in the given mode.
    ///
    /// Returns `Err(AccessError::MissingPermissions)` naming the codes that
    /// were not held when the check fails.
    pub fn require<S: AsRef<str>>(
        &self,
        required: &[S],
        mode: PermissionMode,
    ) -> Result<(), AccessError> {
        if has_permissions(self, required, mode) {
            return Ok(());
        }

        let missing = required
            .iter()
            .map(AsRef::as_ref)
            .filter(|code| !self.contains(code))
            .map(str::to_owned)
            .collect();

        Err(AccessError::MissingPermissions { missing })
    }
}

impl<T: Into<SmolStr>> FromIterator<T> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sorted_codes().serialize(serializer)
    }
}

/// True iff every code in `required` is held. An empty list passes.
pub fn has_all_permissions<S: AsRef<str>>(granted: &PermissionSet, required: &[S]) -> bool {
    required.iter().all(|code| granted.contains(code.as_ref()))
}

/// True iff at least one code in `required` is held. An empty list fails.
pub fn has_any_permission<S: AsRef<str>>(granted: &PermissionSet, required: &[S]) -> bool {
    required.iter().any(|code| granted.contains(code.as_ref()))
}

/// Check `required` against `granted` in the given mode.
///
/// An empty requirement list always passes, in either mode. This differs from
/// calling [`has_any_permission`] directly with an empty list.
pub fn has_permissions<S: AsRef<str>>(
    granted: &PermissionSet,
    required: &[S],
    mode: PermissionMode,
) -> bool {
    if required.is_empty() {
        return true;
    }

    match mode {
        PermissionMode::All => has_all_permissions(granted, required),
        PermissionMode::Any => has_any_permission(granted, required),
    }
}

//! Backoffice Common Library
//!
//! Shared types and pure authorization logic used by the server: the
//! permission catalog, permission sets, the evaluator and the navigation
//! tree filter. Nothing in here performs I/O.

pub mod error;
pub mod navigation;
pub mod permissions;
pub mod types;

pub use error::{AccessError, Error, Result};
pub use navigation::{
    filter_nav_items, filter_navigation, parse_navigation, AccessRequirement, NavItem, NavKind,
};
pub use permissions::{
    has_all_permissions, has_any_permission, has_permissions, Permission, PermissionMode,
    PermissionSet,
};
pub use types::*;

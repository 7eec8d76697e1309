//! Permission checks for routes and handlers.
//!
//! Evaluation itself lives in `bo_common`; this module wires it into axum:
//! - `require_permissions` / `require_permission`: route middleware
//! - helpers on `CurrentUser` for checks inside handlers

pub mod helpers;
pub mod middleware;

pub use middleware::{require_permission, require_permissions};

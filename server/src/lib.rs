//! Backoffice Server
//!
//! Web front for the backoffice: session-based sign-in against the identity
//! service, permission-gated routes and a navigation tree filtered per user.

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod navigation;
pub mod permissions;
pub mod session;

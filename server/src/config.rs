//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{bail, Context, Result};
use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Accepted `SESSION_MAX_AGE` values (up to 30 days).
const SESSION_MAX_AGE_RANGE: RangeInclusive<i64> = 1..=30 * 24 * 60 * 60;

/// Accepted `TOKEN_EXPIRY_SKEW` values (up to 1 hour).
const TOKEN_EXPIRY_SKEW_RANGE: RangeInclusive<i64> = 1..=60 * 60;

/// Minimum `SESSION_SECRET` length in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3000")
    pub bind_address: String,

    /// Base URL of the backend identity/role API
    pub backend_url: String,

    /// Name of the session cookie
    pub session_cookie_name: String,

    /// Whether the session cookie carries the `Secure` attribute
    pub session_cookie_secure: bool,

    /// Key material for signing cookies. A random key is generated when unset,
    /// so cookies do not survive a restart.
    pub session_secret: Option<String>,

    /// Session lifetime in seconds (default: 28800 = 8 hours)
    pub session_max_age: i64,

    /// Seconds before expiry at which a backend token counts as stale (default: 30)
    pub token_expiry_skew: i64,

    /// Where unauthenticated requests are redirected
    pub login_path: String,

    /// Optional JSON file overriding the built-in navigation tree
    pub nav_config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            backend_url: env::var("BACKEND_URL")
                .context("BACKEND_URL must be set")?
                .trim_end_matches('/')
                .to_string(),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "__session".into()),
            session_cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            session_secret: session_secret()?,
            session_max_age: seconds_var("SESSION_MAX_AGE", 28800, SESSION_MAX_AGE_RANGE)?,
            token_expiry_skew: seconds_var("TOKEN_EXPIRY_SKEW", 30, TOKEN_EXPIRY_SKEW_RANGE)?,
            login_path: env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".into()),
            nav_config_path: env::var("NAV_CONFIG_PATH").ok().map(PathBuf::from),
        })
    }

    /// Create a default configuration for testing.
    ///
    /// The backend URL points nowhere; tests that need a backend spawn one
    /// and override `backend_url`.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".into(),
            backend_url: "http://127.0.0.1:9".into(),
            session_cookie_name: "__session".into(),
            session_cookie_secure: false,
            session_secret: None,
            session_max_age: 28800,
            token_expiry_skew: 30,
            login_path: "/login".into(),
            nav_config_path: None,
        }
    }
}

/// Read a duration in seconds, rejecting values outside `range`.
fn seconds_var(name: &str, default: i64, range: RangeInclusive<i64>) -> Result<i64> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    let value: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a whole number of seconds"))?;
    if !range.contains(&value) {
        bail!(
            "{name} must be between {} and {} seconds, got {value}",
            range.start(),
            range.end()
        );
    }
    Ok(value)
}

fn session_secret() -> Result<Option<String>> {
    let Ok(secret) = env::var("SESSION_SECRET") else {
        return Ok(None);
    };
    if secret.len() < MIN_SESSION_SECRET_LEN {
        bail!("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes");
    }
    Ok(Some(secret))
}

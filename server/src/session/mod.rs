//! Session Handling
//!
//! Server-side key/value sessions addressed by a random ID carried in a
//! signed cookie. Handlers load a [`Session`] from the request cookies, mutate
//! it, and commit it back through [`SessionStorage`], which yields the cookie
//! jar to attach to the response.

mod storage;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub use storage::{spawn_session_reaper, SessionStorage};

/// Session key under which flash messages for the UI are stored.
pub const FLASH_MESSAGE_KEY: &str = "message";

/// A request-local copy of a session.
///
/// Changes are only persisted when the session is committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    id: Option<String>,
    data: Map<String, Value>,
    flash: Map<String, Value>,
}

impl Session {
    /// A fresh session that has never been committed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn restore(
        id: Option<String>,
        data: Map<String, Value>,
        flash: Map<String, Value>,
    ) -> Self {
        Self {
            id,
            data,
            flash,
        }
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Map<String, Value>, Map<String, Value>) {
        (self.id, self.data, self.flash)
    }

    /// Storage ID, `None` until first commit.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Read a value, returning `None` if absent or of the wrong shape.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Store a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Store any serializable value.
    pub fn set_json<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<()> {
        self.data.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Remove a value.
    pub fn unset(&mut self, key: &str) {
        self.data.remove(key);
    }

    /// Store a one-shot value, removed on first [`take_flash`](Self::take_flash).
    pub fn flash(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.flash.insert(key.into(), value.into());
    }

    /// Read and remove a flash value.
    pub fn take_flash<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        self.flash
            .remove(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

//! In-process session storage.

use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::Session;
use crate::config::Config;

/// Lifetime of the flash cookie, in seconds.
const FLASH_MAX_AGE_SECS: i64 = 300;

#[derive(Debug, Clone)]
struct SessionRecord {
    data: Map<String, Value>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct CookieSettings {
    name: String,
    flash_name: String,
    secure: bool,
    max_age_secs: i64,
}

/// Session storage shared by all requests.
///
/// Records live in a `DashMap` keyed by session ID; the signed session cookie
/// carries only the ID. Only sessions holding data get a record. Flash values
/// travel in their own short-lived signed cookie, so anonymous visitors never
/// allocate server-side state. Expired records are treated as absent and
/// removed lazily or by [`spawn_session_reaper`].
#[derive(Debug, Clone)]
pub struct SessionStorage {
    records: Arc<DashMap<String, SessionRecord>>,
    settings: Arc<CookieSettings>,
    key: Key,
}

impl SessionStorage {
    /// Create storage using the cookie settings from `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let key = match config.session_secret.as_deref() {
            Some(secret) => Key::try_from(secret.as_bytes()).unwrap_or_else(|err| {
                warn!(error = %err, "Unusable session secret, generating a random key");
                Key::generate()
            }),
            None => {
                warn!("SESSION_SECRET not set, sessions will not survive a restart");
                Key::generate()
            }
        };

        Self {
            records: Arc::new(DashMap::new()),
            settings: Arc::new(CookieSettings {
                name: config.session_cookie_name.clone(),
                flash_name: format!("{}_flash", config.session_cookie_name),
                secure: config.session_cookie_secure,
                max_age_secs: config.session_max_age,
            }),
            key,
        }
    }

    /// Name of the session cookie.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.settings.name
    }

    /// Key signing the session and flash cookies.
    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    /// Load the session referenced by the request cookies.
    ///
    /// Unknown or expired IDs yield a session without an ID. Cookies failing
    /// signature checks never reach this point.
    pub fn get_session(&self, jar: &SignedCookieJar) -> Session {
        let flash = jar
            .get(&self.settings.flash_name)
            .and_then(|cookie| hex::decode(cookie.value()).ok())
            .and_then(|bytes| serde_json::from_slice::<Map<String, Value>>(&bytes).ok())
            .unwrap_or_default();

        let Some(cookie) = jar.get(&self.settings.name) else {
            return Session::restore(None, Map::new(), flash);
        };
        let id = cookie.value();

        // Clone out of the map so no shard guard is held across the remove below.
        let record = self.records.get(id).map(|r| r.value().clone());
        match record {
            Some(record) if record.expires_at > Utc::now() => {
                Session::restore(Some(id.to_string()), record.data, flash)
            }
            Some(_) => {
                debug!("Session expired");
                self.records.remove(id);
                Session::restore(None, Map::new(), flash)
            }
            None => Session::restore(None, Map::new(), flash),
        }
    }

    /// Persist the session and return the jar with the cookies to send back.
    ///
    /// - A session without data holds no record; an existing one is dropped.
    /// - A session with an ID only updates its record while it still exists,
    ///   so a late commit cannot revive a destroyed session.
    /// - Every commit extends the session lifetime.
    pub fn commit_session(&self, jar: SignedCookieJar, session: Session) -> SignedCookieJar {
        let (id, data, flash) = session.into_parts();
        let jar = self.commit_flash(jar, &flash);

        if data.is_empty() {
            if let Some(id) = id {
                self.records.remove(&id);
            }
            return self.remove_cookie(jar, &self.settings.name);
        }

        let expires_at = Utc::now() + chrono::Duration::seconds(self.settings.max_age_secs);
        let id = match id {
            Some(id) => {
                let Some(mut record) = self.records.get_mut(&id) else {
                    debug!("Session destroyed before commit, not recreating");
                    return jar;
                };
                record.data = data;
                record.expires_at = expires_at;
                id
            }
            None => {
                let id = generate_session_id();
                self.records
                    .insert(id.clone(), SessionRecord { data, expires_at });
                id
            }
        };

        jar.add(self.build_cookie(
            self.settings.name.clone(),
            id,
            time::Duration::seconds(self.settings.max_age_secs),
        ))
    }

    /// Detach the session from its ID.
    ///
    /// The old record is removed; data and flash are kept and get a fresh ID
    /// on the next commit.
    pub fn regenerate(&self, session: Session) -> Session {
        let (id, data, flash) = session.into_parts();
        if let Some(id) = id {
            self.records.remove(&id);
        }
        Session::restore(None, data, flash)
    }

    /// Remove the session and clear its cookies client-side.
    pub fn destroy_session(&self, jar: SignedCookieJar, session: Session) -> SignedCookieJar {
        if let Some(id) = session.id() {
            self.records.remove(id);
        }

        let jar = self.remove_cookie(jar, &self.settings.name);
        self.remove_cookie(jar, &self.settings.flash_name)
    }

    /// Drop every expired record. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.records.len();
        self.records.retain(|_, record| record.expires_at > now);
        before.saturating_sub(self.records.len())
    }

    /// Number of stored sessions, including not-yet-purged expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn commit_flash(&self, jar: SignedCookieJar, flash: &Map<String, Value>) -> SignedCookieJar {
        if flash.is_empty() {
            return self.remove_cookie(jar, &self.settings.flash_name);
        }

        // Hex keeps arbitrary message text inside the cookie value grammar.
        match serde_json::to_vec(flash) {
            Ok(value) => jar.add(self.build_cookie(
                self.settings.flash_name.clone(),
                hex::encode(value),
                time::Duration::seconds(FLASH_MAX_AGE_SECS),
            )),
            Err(err) => {
                warn!(error = %err, "Could not encode flash values");
                jar
            }
        }
    }

    /// Emits a removal cookie only when the client sent `name`.
    fn remove_cookie(&self, jar: SignedCookieJar, name: &str) -> SignedCookieJar {
        if jar.get(name).is_none() {
            return jar;
        }
        jar.remove(self.build_cookie(name.to_string(), String::new(), time::Duration::ZERO))
    }

    fn build_cookie(
        &self,
        name: String,
        value: String,
        max_age: time::Duration,
    ) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.settings.secure)
            .max_age(max_age)
            .build()
    }
}

fn generate_session_id() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Spawn the background task that purges expired sessions.
pub fn spawn_session_reaper(
    storage: SessionStorage,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = storage.purge_expired();
            if removed > 0 {
                debug!(removed, "Purged expired sessions");
            }
        }
    })
}

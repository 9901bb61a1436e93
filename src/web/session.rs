use crate::core::dataset::Dataset;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "leap_session";
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const MAX_SESSIONS: usize = 1024;

/// A dataset uploaded by one browser session.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub dataset: Dataset,
    pub source: String,
}

#[derive(Debug)]
struct SessionEntry {
    data: SessionData,
    expires_at: Instant,
    touched: u64,
}

/// Per-session datasets keyed by the `leap_session` cookie value.
///
/// Ids are only ever minted here. Entries expire `ttl` after their last use,
/// and once `capacity` live sessions exist the least recently used one is
/// evicted to make room.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
    capacity: usize,
    clock: AtomicU64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_TTL, MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the session's dataset and extends its lifetime. Expired
    /// entries are dropped on the way.
    pub fn get(&self, id: &str) -> Option<SessionData> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let live = sessions.get(id).map(|entry| entry.expires_at > now)?;
        if !live {
            sessions.remove(id);
            return None;
        }

        let entry = sessions.get_mut(id)?;
        entry.expires_at = now + self.ttl;
        entry.touched = self.tick();
        Some(entry.data.clone())
    }

    /// Stores `data` under `existing` when that id names a live session,
    /// otherwise under a fresh id. Returns the id the data was stored under.
    pub fn store(&self, existing: Option<&str>, data: SessionData) -> String {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, entry| entry.expires_at > now);

        if let Some(id) = existing {
            if let Some(entry) = sessions.get_mut(id) {
                entry.data = data;
                entry.expires_at = now + self.ttl;
                entry.touched = self.tick();
                return id.to_string();
            }
        }

        while sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| (entry.expires_at, entry.touched))
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    tracing::debug!("Evicting session to stay within {} sessions", self.capacity);
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(
            id.clone(),
            SessionEntry {
                data,
                expires_at: now + self.ttl,
                touched: self.tick(),
            },
        );
        id
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

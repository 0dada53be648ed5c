//! Bounded session store
//!
//! Keyed, mutable accumulation state per subject. The store is bounded two
//! ways: a hard capacity with least-recently-active eviction, and a TTL sweep
//! for sessions that went quiet without ever sending the finished signal.
//!
//! Locking follows the single-writer rule: the map lock is held only for
//! lookup/insert/evict, and each session carries its own exclusive lock that
//! callers hold across processing.

use crate::session::state::Session;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Default maximum number of concurrently tracked sessions
pub const DEFAULT_SESSION_CAPACITY: usize = 256;

/// Default inactivity TTL in seconds
pub const DEFAULT_SESSION_TTL_SECS: i64 = 600;

type SharedSession = Arc<Mutex<Session>>;

struct StoreEntry {
    session: SharedSession,
    last_access: DateTime<Utc>,
}

/// Bounded, keyed store of active sessions
pub struct SessionStore {
    entries: Mutex<HashMap<String, StoreEntry>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionStore {
    /// Create a store that tracks at most `capacity` sessions
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Return the session for `id`, creating it with zeroed counters if
    /// absent. Inserting past capacity evicts the least-recently-active
    /// session first.
    pub fn ensure(&self, id: &str, now: DateTime<Utc>) -> SharedSession {
        let mut entries = self.lock_entries();

        if let Some(entry) = entries.get_mut(id) {
            entry.last_access = now;
            return Arc::clone(&entry.session);
        }

        if entries.len() >= self.capacity {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(k, _)| k.clone())
            {
                debug!("session store at capacity, evicting {}", oldest);
                entries.remove(&oldest);
            }
        }

        let session = Arc::new(Mutex::new(Session::new(id, now)));
        entries.insert(
            id.to_string(),
            StoreEntry {
                session: Arc::clone(&session),
                last_access: now,
            },
        );
        session
    }

    /// Look up a session without creating it
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.lock_entries().get(id).map(|e| Arc::clone(&e.session))
    }

    /// Release a session explicitly, returning its handle if it existed
    pub fn remove(&self, id: &str) -> Option<SharedSession> {
        self.lock_entries().remove(id).map(|e| e.session)
    }

    /// Drop sessions idle for longer than `ttl`; returns how many were evicted
    pub fn sweep_expired(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|id, entry| {
            let keep = now - entry.last_access <= ttl;
            if !keep {
                debug!("session {} expired after inactivity", id);
            }
            keep
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock_entries().contains_key(id)
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoreEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

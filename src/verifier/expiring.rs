//! Pending challenges with a time-to-live and a size cap.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{PendingChallenge, SessionKey, SessionStore};
use crate::{Error, Result};

/// Seconds since the Unix epoch.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| unreachable!("System time is after UNIX_EPOCH"))
        .as_secs()
}

#[derive(Debug)]
struct Entry {
    pending: PendingChallenge,
    created_at: u64,
    expires_at: u64,
}

impl Entry {
    fn new(pending: PendingChallenge, ttl: Duration) -> Self {
        let created_at = unix_now();
        Self {
            pending,
            created_at,
            expires_at: created_at.saturating_add(ttl.as_secs()),
        }
    }

    // A clock that stepped backwards past creation also ends the entry.
    fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at || now < self.created_at
    }
}

/// [`SessionStore`] whose entries expire and whose size is bounded.
///
/// An expired entry is never handed out: [`take_and_clear`] treats it as
/// absent, so the verifier reports [`Error::SessionExpired`]. When the store
/// is full, expired entries are swept before a new session is refused.
///
/// [`take_and_clear`]: SessionStore::take_and_clear
#[derive(Debug)]
pub struct ExpiringSessionStore {
    entries: Mutex<HashMap<SessionKey, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl ExpiringSessionStore {
    /// Creates a store whose entries live for `ttl`, holding at most
    /// `capacity` sessions.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for ExpiringSessionStore {
    fn put(
        &self,
        key: &SessionKey,
        pending: PendingChallenge,
    ) -> Result<Option<PendingChallenge>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let now = unix_now();

        if !entries.contains_key(key) && entries.len() >= self.capacity {
            entries.retain(|_, entry| !entry.is_expired(now));

            if entries.len() >= self.capacity {
                return Err(Error::CapacityExceeded(format!(
                    "pending challenge limit of {} reached",
                    self.capacity
                )));
            }
        }

        let previous = entries.insert(key.clone(), Entry::new(pending, self.ttl));
        Ok(previous
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.pending))
    }

    fn take_and_clear(&self, key: &SessionKey) -> Option<PendingChallenge> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .filter(|entry| !entry.is_expired(unix_now()))
            .map(|entry| entry.pending)
    }

    fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let now = unix_now();
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

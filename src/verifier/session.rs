//! Per-session pending challenge storage.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use num_bigint::BigUint;
use rand::RngCore;

use crate::{Result, SecureRng};

/// Number of random bytes in a freshly minted session key.
const SESSION_KEY_BYTES: usize = 32;

/// Opaque identifier of the transport session an attempt belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wraps an existing session identifier.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Mints a fresh random key, hex-encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_KEY_BYTES];
        SecureRng::new().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A claim that has been answered with a challenge and awaits a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingChallenge {
    /// Identity the prover claimed.
    pub subject_identity: String,
    /// Prover's commitment `t`, in `[1, p-1]`.
    pub commitment: BigUint,
    /// Challenge `c` sent back to the prover.
    pub challenge: BigUint,
}

/// Keyed storage for at most one [`PendingChallenge`] per session.
///
/// Both operations must be atomic per key.
pub trait SessionStore: Send + Sync {
    /// Stores `pending` for `key`, returning whatever it replaced.
    ///
    /// Bounded stores return [`Error::CapacityExceeded`](crate::Error) when
    /// `key` is new and no room is left.
    fn put(&self, key: &SessionKey, pending: PendingChallenge)
        -> Result<Option<PendingChallenge>>;

    /// Removes and returns the pending challenge for `key`, if any.
    fn take_and_clear(&self, key: &SessionKey) -> Option<PendingChallenge>;

    /// Drops entries the store considers stale and returns how many went.
    ///
    /// Stores without a notion of staleness keep everything.
    fn purge_expired(&self) -> usize {
        0
    }
}

/// In-process [`SessionStore`] backed by a hash map.
///
/// Entries live until consumed or overwritten. The server wraps pending
/// challenges in an expiring store instead.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    pending: Mutex<HashMap<SessionKey, PendingChallenge>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with a pending challenge.
    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no session has a pending challenge.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn put(
        &self,
        key: &SessionKey,
        pending: PendingChallenge,
    ) -> Result<Option<PendingChallenge>> {
        Ok(self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), pending))
    }

    fn take_and_clear(&self, key: &SessionKey) -> Option<PendingChallenge> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

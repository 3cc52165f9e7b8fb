//! Registered identities and their public keys.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use num_bigint::BigUint;

use crate::{Error, Result};

/// Lookup and registration of public keys, keyed by identity.
pub trait IdentityStore: Send + Sync {
    /// Returns the public key registered for `identity`.
    fn lookup(&self, identity: &str) -> Option<BigUint>;

    /// Registers `public_key` for `identity`.
    ///
    /// Returns [`Error::IdentityExists`] if the identity is taken, or
    /// [`Error::CapacityExceeded`] if a bounded store is full.
    fn store(&self, identity: &str, public_key: BigUint) -> Result<()>;
}

/// In-process [`IdentityStore`], optionally bounded.
#[derive(Debug)]
pub struct MemoryIdentityStore {
    keys: RwLock<HashMap<String, BigUint>>,
    limit: usize,
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::with_limit(usize::MAX)
    }
}

impl MemoryIdentityStore {
    /// Creates an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that holds at most `limit` identities.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            limit,
        }
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn lookup(&self, identity: &str) -> Option<BigUint> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .cloned()
    }

    fn store(&self, identity: &str, public_key: BigUint) -> Result<()> {
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);

        if keys.contains_key(identity) {
            return Err(Error::IdentityExists(identity.to_string()));
        }

        if keys.len() >= self.limit {
            return Err(Error::CapacityExceeded(format!(
                "identity limit of {} reached",
                self.limit
            )));
        }

        keys.insert(identity.to_string(), public_key);
        Ok(())
    }
}

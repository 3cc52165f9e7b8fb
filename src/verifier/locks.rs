//! One-at-a-time execution per session key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::SessionKey;

/// Serializes operations that share a session key.
///
/// A claim racing a verification on the same session would otherwise let
/// the claim overwrite the pending challenge between the verifier's read
/// and its decision. Operations on different keys never wait on each other.
/// Lock slots are dropped as soon as no operation holds or awaits them.
#[derive(Debug, Default)]
pub struct SessionLocks {
    slots: Mutex<HashMap<SessionKey, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `key`.
    pub fn with_session<T>(&self, key: &SessionKey, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let result = {
            let _held = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // The table and this call are the only owners left.
        if Arc::strong_count(&slot) == 2 {
            slots.remove(key);
        }

        result
    }

    /// Number of sessions with an operation in flight.
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn slots_are_released_after_use() {
        let locks = SessionLocks::new();
        let key = SessionKey::from("s1");

        let value = locks.with_session(&key, || {
            assert_eq!(locks.active(), 1);
            42
        });

        assert_eq!(value, 42);
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn same_session_runs_one_at_a_time() {
        let locks = Arc::new(SessionLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    locks.with_session(&SessionKey::from("shared"), || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let outer = SessionKey::from("outer");
        let inner = SessionKey::from("inner");

        let value = locks.with_session(&outer, || locks.with_session(&inner, || 7));
        assert_eq!(value, 7);
        assert_eq!(locks.active(), 0);
    }
}

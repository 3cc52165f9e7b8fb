//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use schnorr_zkp_auth::verifier::{MemoryIdentityStore, MemorySessionStore, SessionLocks};
use schnorr_zkp_auth::{ChallengeIssuer, DomainParameters, RandomSource, Verifier};

/// Initialize test tracing (call once at the beginning of tests).
///
/// Only logs from this crate are shown. Subsequent calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("schnorr_zkp_auth=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// An issuer and verifier wired to the same in-memory stores.
pub struct Harness {
    pub params: DomainParameters,
    pub identities: Arc<MemoryIdentityStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub issuer: ChallengeIssuer,
    pub verifier: Verifier,
}

impl Harness {
    pub fn new(params: DomainParameters, rng: Arc<dyn RandomSource>) -> Self {
        let identities = Arc::new(MemoryIdentityStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let locks = Arc::new(SessionLocks::new());

        let issuer = ChallengeIssuer::new(
            params.clone(),
            identities.clone(),
            sessions.clone(),
            locks.clone(),
            rng,
        );
        let verifier = Verifier::new(params.clone(), identities.clone(), sessions.clone(), locks);

        Self {
            params,
            identities,
            sessions,
            issuer,
            verifier,
        }
    }

    pub fn demo(rng: Arc<dyn RandomSource>) -> Self {
        Self::new(DomainParameters::demo(), rng)
    }
}

//! Verifier (server) side of the Schnorr protocol.
//!
//! This module contains the challenge issuer, the verification check, the
//! session and identity stores they share, and, behind the `server` feature,
//! the gRPC service with its configuration and state.

use std::sync::Arc;

use num_bigint::BigUint;

use crate::{DomainParameters, Error, Result};

/// Registered public keys.
pub mod identity;
/// Challenge issuing for identity claims.
pub mod issuer;
/// Per-session serialization.
pub mod locks;
/// Pending challenge storage.
pub mod session;

#[cfg(feature = "server")]
/// Server configuration.
pub mod config;

#[cfg(feature = "server")]
/// Expiring, bounded pending challenge storage.
pub mod expiring;

#[cfg(feature = "server")]
/// gRPC service implementation.
pub mod service;

#[cfg(feature = "server")]
/// Server state management.
pub mod state;

pub use identity::{IdentityStore, MemoryIdentityStore};
pub use issuer::ChallengeIssuer;
pub use locks::SessionLocks;
pub use session::{MemorySessionStore, PendingChallenge, SessionKey, SessionStore};

#[cfg(feature = "server")]
pub use config::{ParameterSet, ServerConfig};
#[cfg(feature = "server")]
pub use expiring::ExpiringSessionStore;
#[cfg(feature = "server")]
pub use service::AuthServiceImpl;
#[cfg(feature = "server")]
pub use state::{ServerState, StateLimits};

/// Outcome of one verification, accepted or not.
///
/// `lhs` and `rhs` are the two sides of `g^s = t * y^c (mod p)`. They are
/// returned for auditing and reveal nothing about the private exponent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether both sides agree.
    pub accepted: bool,
    /// `g^s mod p`.
    pub lhs: BigUint,
    /// `t * y^c mod p`.
    pub rhs: BigUint,
    /// Identity the consumed challenge was issued to.
    pub subject_identity: String,
}

/// Verifier for the Schnorr zero-knowledge protocol.
///
/// Checks a response against the pending challenge of a session without
/// learning the secret exponent.
///
/// # Security
///
/// - The pending challenge is consumed by every call, successful or not, so
///   a challenge can be answered once
/// - Acceptance only reports the outcome; establishing an authenticated
///   session is up to the caller
#[derive(Clone)]
pub struct Verifier {
    params: DomainParameters,
    identities: Arc<dyn IdentityStore>,
    sessions: Arc<dyn SessionStore>,
    locks: Arc<SessionLocks>,
}

impl Verifier {
    /// Creates a verifier over the stores shared with a
    /// [`ChallengeIssuer`].
    pub fn new(
        params: DomainParameters,
        identities: Arc<dyn IdentityStore>,
        sessions: Arc<dyn SessionStore>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            params,
            identities,
            sessions,
            locks,
        }
    }

    /// Consumes the session's pending challenge and checks `response`.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the session has no pending challenge;
    ///   the caller must restart from a fresh claim
    /// - [`Error::IdentityNotFound`] if the subject was removed from the
    ///   identity store after the claim
    ///
    /// A rejected proof is `Ok` with `accepted == false`.
    pub fn verify(&self, session: &SessionKey, response: &BigUint) -> Result<VerificationResult> {
        self.locks.with_session(session, || -> Result<VerificationResult> {
            let pending = self
                .sessions
                .take_and_clear(session)
                .ok_or(Error::SessionExpired)?;

            let public_key = self
                .identities
                .lookup(&pending.subject_identity)
                .ok_or_else(|| Error::IdentityNotFound(pending.subject_identity.clone()))?;

            Ok(self.check(&pending, &public_key, response))
        })
    }

    /// Evaluates `g^s == t * y^c (mod p)` for a pending challenge.
    pub fn check(
        &self,
        pending: &PendingChallenge,
        public_key: &BigUint,
        response: &BigUint,
    ) -> VerificationResult {
        let p = self.params.modulus();

        let lhs = self.params.pow_generator(response);
        let rhs = (&pending.commitment * public_key.modpow(&pending.challenge, p)) % p;

        VerificationResult {
            accepted: lhs == rhs,
            lhs,
            rhs,
            subject_identity: pending.subject_identity.clone(),
        }
    }
}

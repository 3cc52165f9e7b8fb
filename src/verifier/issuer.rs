use std::sync::Arc;

use num_bigint::BigUint;
use tracing::debug;

use super::{IdentityStore, PendingChallenge, SessionKey, SessionLocks, SessionStore};
use crate::{DomainParameters, Error, RandomSource, Result};

/// Answers identity claims with a random challenge.
///
/// A valid claim stores a [`PendingChallenge`] for the session, replacing
/// any earlier one, so that only the most recent claim can be verified.
#[derive(Clone)]
pub struct ChallengeIssuer {
    params: DomainParameters,
    identities: Arc<dyn IdentityStore>,
    sessions: Arc<dyn SessionStore>,
    locks: Arc<SessionLocks>,
    rng: Arc<dyn RandomSource>,
}

impl ChallengeIssuer {
    /// Creates an issuer over shared stores.
    ///
    /// `locks` must be the same table the [`Verifier`](super::Verifier)
    /// uses for these sessions.
    pub fn new(
        params: DomainParameters,
        identities: Arc<dyn IdentityStore>,
        sessions: Arc<dyn SessionStore>,
        locks: Arc<SessionLocks>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            params,
            identities,
            sessions,
            locks,
            rng,
        }
    }

    /// Handles a claim of `identity` with commitment `t`.
    ///
    /// # Errors
    ///
    /// - [`Error::IdentityNotFound`] if the identity is not registered
    /// - [`Error::InvalidCommitment`] if `t` is outside `[1, p-1]`
    /// - [`Error::Randomness`] if no challenge could be drawn
    /// - [`Error::CapacityExceeded`] if the session store has no room
    ///
    /// Session state is untouched on every error path.
    pub fn issue(
        &self,
        session: &SessionKey,
        identity: &str,
        commitment: &BigUint,
    ) -> Result<BigUint> {
        self.locks
            .with_session(session, || self.issue_locked(session, identity, commitment))
    }

    fn issue_locked(
        &self,
        session: &SessionKey,
        identity: &str,
        commitment: &BigUint,
    ) -> Result<BigUint> {
        if self.identities.lookup(identity).is_none() {
            return Err(Error::IdentityNotFound(identity.to_string()));
        }

        if !self.params.is_group_element(commitment) {
            return Err(Error::InvalidCommitment(
                "commitment must lie in [1, modulus-1]".to_string(),
            ));
        }

        let (low, high) = self.params.challenge_range();
        let challenge = self.rng.uniform_inclusive(&low, &high)?;

        let pending = PendingChallenge {
            subject_identity: identity.to_string(),
            commitment: commitment.clone(),
            challenge: challenge.clone(),
        };

        if let Some(previous) = self.sessions.put(session, pending)? {
            debug!(
                session = %session,
                previous_identity = %previous.subject_identity,
                "Superseded pending challenge"
            );
        }

        Ok(challenge)
    }
}

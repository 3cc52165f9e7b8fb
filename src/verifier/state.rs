use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use num_bigint::BigUint;
use tokio::sync::RwLock;

use super::expiring::unix_now;
use super::{
    ChallengeIssuer, ExpiringSessionStore, IdentityStore, MemoryIdentityStore, SessionKey,
    SessionLocks, SessionStore, VerificationResult, Verifier,
};
use crate::{DomainParameters, Error, RandomSource, Result, SecureRng};

const CHALLENGE_EXPIRY_SECONDS: u64 = 300;
const SESSION_EXPIRY_SECONDS: u64 = 3600; // 1 hour

const MAX_TOTAL_IDENTITIES: usize = 10_000;
const MAX_TOTAL_CHALLENGES: usize = 50_000;
const MAX_TOTAL_SESSIONS: usize = 100_000;

/// Lifetimes and size caps for server-side state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateLimits {
    /// How long a pending challenge may wait for its response.
    pub challenge_ttl: Duration,
    /// How long an authenticated session lasts without logout.
    pub session_ttl: Duration,
    /// Most identities that can be registered.
    pub max_identities: usize,
    /// Most sessions that can hold a pending challenge at once.
    pub max_pending_challenges: usize,
    /// Most authenticated sessions at once.
    pub max_sessions: usize,
}

impl Default for StateLimits {
    fn default() -> Self {
        Self {
            challenge_ttl: Duration::from_secs(CHALLENGE_EXPIRY_SECONDS),
            session_ttl: Duration::from_secs(SESSION_EXPIRY_SECONDS),
            max_identities: MAX_TOTAL_IDENTITIES,
            max_pending_challenges: MAX_TOTAL_CHALLENGES,
            max_sessions: MAX_TOTAL_SESSIONS,
        }
    }
}

/// A session that completed a successful proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedSession {
    /// Identity the session proved.
    pub identity: String,
    /// Unix timestamp of the accepted proof.
    pub authenticated_at: u64,
    /// Unix timestamp when the session expires.
    pub expires_at: u64,
}

impl AuthenticatedSession {
    fn new(identity: String, ttl: Duration) -> Self {
        let authenticated_at = unix_now();

        Self {
            identity,
            authenticated_at,
            expires_at: authenticated_at.saturating_add(ttl.as_secs()),
        }
    }

    /// Checks if the session has expired.
    pub fn is_expired(&self) -> bool {
        unix_now() >= self.expires_at
    }
}

/// Server state: registered identities, pending challenges and the
/// sessions that have logged in.
///
/// Cloning is cheap and every clone shares the same stores.
#[derive(Clone)]
pub struct ServerState {
    params: DomainParameters,
    limits: StateLimits,
    identities: Arc<dyn IdentityStore>,
    sessions: Arc<dyn SessionStore>,
    issuer: ChallengeIssuer,
    verifier: Verifier,
    authenticated: Arc<RwLock<HashMap<SessionKey, AuthenticatedSession>>>,
}

impl ServerState {
    /// Creates state with default limits, bounded in-memory stores and OS
    /// randomness.
    pub fn new(params: DomainParameters) -> Self {
        Self::with_limits(params, StateLimits::default())
    }

    /// Creates state with bounded in-memory stores sized by `limits`.
    pub fn with_limits(params: DomainParameters, limits: StateLimits) -> Self {
        Self::with_stores(
            params,
            limits,
            Arc::new(MemoryIdentityStore::with_limit(limits.max_identities)),
            Arc::new(ExpiringSessionStore::new(
                limits.challenge_ttl,
                limits.max_pending_challenges,
            )),
            Arc::new(SecureRng::new()),
        )
    }

    /// Creates state over caller-supplied stores and random source.
    ///
    /// Only the authenticated-session limits apply here; the stores enforce
    /// their own.
    pub fn with_stores(
        params: DomainParameters,
        limits: StateLimits,
        identities: Arc<dyn IdentityStore>,
        sessions: Arc<dyn SessionStore>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        let locks = Arc::new(SessionLocks::new());
        let issuer = ChallengeIssuer::new(
            params.clone(),
            Arc::clone(&identities),
            Arc::clone(&sessions),
            Arc::clone(&locks),
            rng,
        );
        let verifier = Verifier::new(
            params.clone(),
            Arc::clone(&identities),
            Arc::clone(&sessions),
            locks,
        );

        Self {
            params,
            limits,
            identities,
            sessions,
            issuer,
            verifier,
            authenticated: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the domain parameters.
    pub fn params(&self) -> &DomainParameters {
        &self.params
    }

    /// Registers a public key for a new identity.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPublicKey`] if the key lies outside `[1, p-1]`
    /// - [`Error::IdentityExists`] if the identity is taken
    /// - [`Error::CapacityExceeded`] if the identity store is full
    pub fn register(&self, identity: &str, public_key: BigUint) -> Result<()> {
        if !self.params.is_group_element(&public_key) {
            return Err(Error::InvalidPublicKey(
                "public key must lie in [1, modulus-1]".to_string(),
            ));
        }

        self.identities.store(identity, public_key)
    }

    /// Answers a claim with a challenge. See [`ChallengeIssuer::issue`].
    pub fn issue(
        &self,
        session: &SessionKey,
        identity: &str,
        commitment: &BigUint,
    ) -> Result<BigUint> {
        self.issuer.issue(session, identity, commitment)
    }

    /// Verifies a response and, on acceptance, marks the session as
    /// authenticated for the proven identity.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`Verifier::verify`], returns
    /// [`Error::CapacityExceeded`] for an accepted proof when no room is left
    /// for another authenticated session.
    pub async fn verify(
        &self,
        session: &SessionKey,
        response: &BigUint,
    ) -> Result<VerificationResult> {
        let result = self.verifier.verify(session, response)?;

        if result.accepted {
            let mut authenticated = self.authenticated.write().await;

            if !authenticated.contains_key(session)
                && authenticated.len() >= self.limits.max_sessions
            {
                authenticated.retain(|_, data| !data.is_expired());

                if authenticated.len() >= self.limits.max_sessions {
                    return Err(Error::CapacityExceeded(format!(
                        "session limit of {} reached",
                        self.limits.max_sessions
                    )));
                }
            }

            let data =
                AuthenticatedSession::new(result.subject_identity.clone(), self.limits.session_ttl);
            authenticated.insert(session.clone(), data);
        }

        Ok(result)
    }

    /// Returns the authenticated session, if the session has logged in and
    /// not yet expired.
    pub async fn authenticated(&self, session: &SessionKey) -> Option<AuthenticatedSession> {
        self.authenticated
            .read()
            .await
            .get(session)
            .filter(|data| !data.is_expired())
            .cloned()
    }

    /// Ends an authenticated session. Returns whether a live one existed.
    pub async fn logout(&self, session: &SessionKey) -> bool {
        self.authenticated
            .write()
            .await
            .remove(session)
            .is_some_and(|data| !data.is_expired())
    }

    /// Returns the number of authenticated sessions, expired ones included
    /// until cleaned up.
    pub async fn session_count(&self) -> usize {
        self.authenticated.read().await.len()
    }

    /// Drops pending challenges past their lifetime. Returns how many went.
    pub fn cleanup_expired_challenges(&self) -> usize {
        self.sessions.purge_expired()
    }

    /// Drops authenticated sessions past their lifetime. Returns how many
    /// went.
    pub async fn cleanup_expired_sessions(&self) -> usize {
        let mut authenticated = self.authenticated.write().await;
        let before = authenticated.len();

        authenticated.retain(|_, data| !data.is_expired());
        before - authenticated.len()
    }
}

//! Password authentication with an interactive Schnorr zero-knowledge proof.
//!
//! The prover derives a private exponent `x` from a password and registers
//! only `y = g^x mod p`. Logging in is three moves:
//!
//! 1. the prover sends its identity and a commitment `t = g^k mod p`
//! 2. the server stores `(identity, t, c)` for the session and returns a
//!    random challenge `c`
//! 3. the prover answers `s = (k + c * x) mod (p-1)`; the server accepts iff
//!    `g^s = t * y^c (mod p)` and discards the pending challenge either way
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use schnorr_zkp_auth::verifier::{
//!     ChallengeIssuer, IdentityStore, MemoryIdentityStore, MemorySessionStore, SessionKey,
//!     SessionLocks,
//! };
//! use schnorr_zkp_auth::{DomainParameters, KeyPair, Prover, SecureRng, Verifier};
//!
//! let params = DomainParameters::demo();
//! let identities = Arc::new(MemoryIdentityStore::new());
//! let sessions = Arc::new(MemorySessionStore::new());
//! let locks = Arc::new(SessionLocks::new());
//!
//! let issuer = ChallengeIssuer::new(
//!     params.clone(),
//!     identities.clone(),
//!     sessions.clone(),
//!     locks.clone(),
//!     Arc::new(SecureRng::new()),
//! );
//! let verifier = Verifier::new(params.clone(), identities.clone(), sessions, locks);
//!
//! let keys = KeyPair::derive(b"password123", &params).unwrap();
//! identities.store("neo", keys.public_key().clone()).unwrap();
//!
//! let prover = Prover::new(params);
//! let session = SessionKey::generate();
//! let (commitment, nonce) = prover.commit(&SecureRng::new()).unwrap();
//! let challenge = issuer.issue(&session, "neo", &commitment).unwrap();
//! let response = prover.respond(&challenge, nonce, keys.private_exponent()).unwrap();
//!
//! assert!(verifier.verify(&session, &response).unwrap().accepted);
//! ```

/// Error types.
pub mod error;
/// Domain parameters and randomness.
pub mod primitives;
/// Key derivation and the prover.
pub mod protocol;
/// Challenge issuing, verification and the server.
pub mod verifier;
/// Decimal-string integer codec.
pub mod wire;

/// Generated gRPC types for the authentication service.
#[cfg(feature = "grpc")]
#[allow(missing_docs, clippy::all)]
pub mod proto {
    tonic::include_proto!("schnorr_auth");
}

pub use error::{Error, Result};
pub use primitives::{DomainParameters, RandomSource, ScriptedRandom, SecureRng};
pub use protocol::{KeyPair, Nonce, PrivateExponent, Prover};
pub use verifier::{ChallengeIssuer, VerificationResult, Verifier};

//! Error types for Schnorr authentication.
//!
//! A rejected proof is not an error: it is reported through
//! [`VerificationResult::accepted`](crate::VerificationResult). No variant
//! ever carries a private exponent or a prover nonce.

/// Main error types for the library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed domain parameters. Fatal at startup.
    #[error("Invalid domain parameters: {0}")]
    InvalidParameters(String),

    /// The claimed identity is not registered.
    #[error("Identity '{0}' not found")]
    IdentityNotFound(String),

    /// The identity already has a public key on record.
    #[error("Identity '{0}' already registered")]
    IdentityExists(String),

    /// Commitment outside `[1, modulus-1]`.
    #[error("Invalid commitment: {0}")]
    InvalidCommitment(String),

    /// Challenge outside the range the prover accepts.
    #[error("Invalid challenge: {0}")]
    InvalidChallenge(String),

    /// Public key outside `[1, modulus-1]`.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// No pending challenge for this session. Restart from the claim.
    #[error("Session expired: no pending challenge")]
    SessionExpired,

    /// An integer could not be decoded from its wire form.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A server-side store is full.
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// The random source could not produce a value.
    #[error("Randomness failure: {0}")]
    Randomness(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

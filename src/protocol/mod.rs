//! Prover side of the protocol: key derivation and the two prover moves.

/// Registration key derivation.
pub mod keys;
/// Prover implementation for the commitment and response moves.
pub mod prover;

pub use keys::{KeyPair, PrivateExponent};
pub use prover::{Nonce, Prover};

//! Arithmetic building blocks shared by the prover and the verifier.
//!
//! - **params**: the modulus and generator every party agrees on
//! - **rng**: injectable randomness for nonces and challenges

/// Domain parameters.
pub mod params;
/// Random sources.
pub mod rng;

pub use params::DomainParameters;
pub use rng::{RandomSource, ScriptedRandom, SecureRng};

use core::fmt;

use num_bigint::BigUint;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::keys::wipe;
use super::PrivateExponent;
use crate::{DomainParameters, Error, RandomSource, Result};

/// Prover for the Schnorr identification protocol.
///
/// Demonstrates knowledge of `x` such that `y = g^x mod p` without revealing
/// `x`. A single attempt is `commit` followed by exactly one `respond`.
///
/// # Security
///
/// - Always draw nonces from [`SecureRng`](crate::SecureRng) outside of tests
/// - Never answer two challenges with the same nonce: two responses for one
///   commitment reveal `x`. [`Nonce`] is consumed by [`Prover::respond`] and
///   cannot be cloned, which enforces this at compile time
pub struct Prover {
    params: DomainParameters,
}

impl Prover {
    /// Creates a new prover over the given parameters.
    pub fn new(params: DomainParameters) -> Self {
        Self { params }
    }

    /// Returns the domain parameters.
    pub fn params(&self) -> &DomainParameters {
        &self.params
    }

    /// First move: draws a nonce `k` in `[1, p-2]` and commits to `t = g^k mod p`.
    ///
    /// The nonce stays with the prover until [`Prover::respond`].
    pub fn commit<R: RandomSource + ?Sized>(&self, rng: &R) -> Result<(BigUint, Nonce)> {
        let (low, high) = self.params.nonce_range();
        let k = rng.uniform_inclusive(&low, &high)?;
        let commitment = self.params.pow_generator(&k);

        Ok((commitment, Nonce(k)))
    }

    /// Third move: computes `s = (k + c * x) mod (p-1)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChallenge`] if the challenge lies outside
    /// `[1, p-2]`. The verifier is not trusted to stay in range.
    pub fn respond(
        &self,
        challenge: &BigUint,
        nonce: Nonce,
        private_exponent: &PrivateExponent,
    ) -> Result<BigUint> {
        let (low, high) = self.params.challenge_range();
        if challenge < &low || challenge > &high {
            return Err(Error::InvalidChallenge(format!(
                "challenge must lie in [{low}, {high}]"
            )));
        }

        let order = self.params.exponent_modulus();
        let mut blinded = challenge * private_exponent.expose();
        blinded += &nonce.0;

        let response = &blinded % order;
        wipe(&mut blinded);
        Ok(response)
    }
}

/// Secret nonce used in the commitment phase.
///
/// Not `Clone`: it is moved into [`Prover::respond`] and wiped when dropped
/// there.
pub struct Nonce(BigUint);

impl Zeroize for Nonce {
    fn zeroize(&mut self) {
        wipe(&mut self.0);
    }
}

impl Drop for Nonce {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for Nonce {}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce(<redacted>)")
    }
}

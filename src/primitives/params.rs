//! Domain parameters shared by prover and verifier.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{Error, Result};

/// Modulus used by the original demo deployment. Small enough to print.
const DEMO_MODULUS: u64 = 2_695_139;
const DEMO_GENERATOR: u64 = 2;

/// RFC 3526 group 14 (2048-bit MODP), generator 2.
const RFC3526_2048_MODULUS_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9",
    "DE2BCBF6955817183995497CEA956AE515D2261898FA0510",
    "15728E5A8AACAA68FFFFFFFFFFFFFFFF",
);
const RFC3526_2048_GENERATOR: u64 = 2;

/// Public parameters of the discrete-log group: a prime modulus `p` and a
/// generator `g` of large multiplicative order.
///
/// Values are immutable once constructed. Every component takes its own copy
/// at construction time, so tests can run against tiny groups side by side
/// with production-sized ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainParameters {
    modulus: BigUint,
    generator: BigUint,
}

impl DomainParameters {
    /// Creates parameters from an explicit modulus and generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] if the modulus is not an odd
    /// integer `>= 5` or the generator lies outside `[2, modulus-2]`.
    ///
    /// Primality of the modulus is the caller's responsibility.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use num_bigint::BigUint;
    /// use schnorr_zkp_auth::DomainParameters;
    ///
    /// let params = DomainParameters::new(BigUint::from(23u32), BigUint::from(5u32)).unwrap();
    /// assert_eq!(params.modulus(), &BigUint::from(23u32));
    /// ```
    pub fn new(modulus: BigUint, generator: BigUint) -> Result<Self> {
        let params = Self { modulus, generator };
        params.validate()?;
        Ok(params)
    }

    /// The parameter set of the original deployment: `p = 2695139`, `g = 2`.
    ///
    /// Only suitable for tests and demonstrations.
    pub fn demo() -> Self {
        Self {
            modulus: BigUint::from(DEMO_MODULUS),
            generator: BigUint::from(DEMO_GENERATOR),
        }
    }

    /// RFC 3526 2048-bit MODP group with generator 2.
    pub fn rfc3526_2048() -> Self {
        let modulus = BigUint::parse_bytes(RFC3526_2048_MODULUS_HEX.as_bytes(), 16)
            .unwrap_or_else(|| unreachable!("RFC 3526 modulus is valid hex"));
        Self {
            modulus,
            generator: BigUint::from(RFC3526_2048_GENERATOR),
        }
    }

    #[cfg(test)]
    pub(crate) fn new_unchecked(modulus: BigUint, generator: BigUint) -> Self {
        Self { modulus, generator }
    }

    /// Checks the structural constraints on the modulus and generator.
    pub fn validate(&self) -> Result<()> {
        if self.modulus < BigUint::from(5u32) {
            return Err(Error::InvalidParameters(
                "modulus must be at least 5".to_string(),
            ));
        }

        if (&self.modulus % 2u32).is_zero() {
            return Err(Error::InvalidParameters("modulus must be odd".to_string()));
        }

        let max_generator = &self.modulus - 2u32;
        if self.generator < BigUint::from(2u32) || self.generator > max_generator {
            return Err(Error::InvalidParameters(
                "generator must lie in [2, modulus-2]".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Returns the generator `g`.
    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// Returns `p - 1`, the modulus for exponent arithmetic.
    pub fn exponent_modulus(&self) -> BigUint {
        &self.modulus - 1u32
    }

    /// Computes `g^exponent mod p`.
    pub fn pow_generator(&self, exponent: &BigUint) -> BigUint {
        self.generator.modpow(exponent, &self.modulus)
    }

    /// Whether `value` is a non-zero residue, i.e. lies in `[1, p-1]`.
    pub fn is_group_element(&self, value: &BigUint) -> bool {
        !value.is_zero() && value < &self.modulus
    }

    /// Inclusive range from which nonces are drawn: `[1, p-2]`.
    pub fn nonce_range(&self) -> (BigUint, BigUint) {
        (BigUint::one(), &self.modulus - 2u32)
    }

    /// Inclusive range from which challenges are drawn: `[1, p-2]`.
    ///
    /// `p-1` is excluded: as an exponent it is congruent to zero and would
    /// make `y^c = 1`, so a prover could answer without knowing `x`.
    pub fn challenge_range(&self) -> (BigUint, BigUint) {
        (BigUint::one(), &self.modulus - 2u32)
    }
}

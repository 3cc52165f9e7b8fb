//! Registration key derivation.

use core::fmt;

use num_bigint::BigUint;
use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{DomainParameters, Error, Result};

/// Clears the limbs of `value` in place, before its buffer is released.
///
/// `BigUint` has no `Zeroize` impl and arithmetic makes its own temporaries,
/// so this covers the values we own, not every copy the arithmetic made.
pub(crate) fn wipe(value: &mut BigUint) {
    for bit in 0..value.bits() {
        value.set_bit(bit, false);
    }
}

/// The prover's secret `x`, in `[0, p-2]`.
///
/// Never leaves the prover. `Debug` is redacted, the type has no `Display`
/// or serialization, and the value is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateExponent(BigUint);

impl Zeroize for PrivateExponent {
    fn zeroize(&mut self) {
        wipe(&mut self.0);
    }
}

impl Drop for PrivateExponent {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for PrivateExponent {}

impl PrivateExponent {
    /// Returns the exponent value.
    pub fn expose(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Debug for PrivateExponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateExponent(<redacted>)")
    }
}

/// A private exponent and its public key `y = g^x mod p`.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private_exponent: PrivateExponent,
    public_key: BigUint,
}

impl KeyPair {
    /// Derives a key pair from a credential such as a password.
    ///
    /// The credential is hashed with SHA-256, the digest is read as a
    /// big-endian integer `h`, and `x = h mod (p-1)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] if `params` are malformed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schnorr_zkp_auth::{DomainParameters, KeyPair};
    ///
    /// let params = DomainParameters::demo();
    /// let keys = KeyPair::derive(b"password123", &params).unwrap();
    /// assert_eq!(keys.public_key().to_string(), "451317");
    /// ```
    pub fn derive(credential: &[u8], params: &DomainParameters) -> Result<Self> {
        params.validate()?;

        let mut digest = Zeroizing::new([0u8; 32]);
        let mut hasher = Sha256::new();
        hasher.update(credential);
        hasher.finalize_into(GenericArray::from_mut_slice(digest.as_mut_slice()));

        let mut h = BigUint::from_bytes_be(digest.as_slice());
        let x = &h % params.exponent_modulus();
        wipe(&mut h);

        Ok(Self::from_reduced(x, params))
    }

    /// Builds a key pair from a known exponent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] if `params` are malformed or the
    /// exponent is not below `p-1`.
    pub fn from_exponent(exponent: BigUint, params: &DomainParameters) -> Result<Self> {
        params.validate()?;

        if exponent >= params.exponent_modulus() {
            return Err(Error::InvalidParameters(
                "private exponent must lie in [0, modulus-2]".to_string(),
            ));
        }

        Ok(Self::from_reduced(exponent, params))
    }

    fn from_reduced(x: BigUint, params: &DomainParameters) -> Self {
        let public_key = params.pow_generator(&x);
        Self {
            private_exponent: PrivateExponent(x),
            public_key,
        }
    }

    /// Returns the private exponent.
    pub fn private_exponent(&self) -> &PrivateExponent {
        &self.private_exponent
    }

    /// Returns the public key.
    pub fn public_key(&self) -> &BigUint {
        &self.public_key
    }

    /// Splits the pair, handing the public key to registration.
    pub fn into_parts(self) -> (PrivateExponent, BigUint) {
        (self.private_exponent, self.public_key)
    }
}

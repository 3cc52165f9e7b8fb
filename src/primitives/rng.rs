//! Sources of uniformly distributed integers.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use num_bigint::{BigUint, RandBigInt};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::{Error, Result};

/// Produces integers uniformly distributed in an inclusive range.
///
/// Challenges and nonces are drawn through this trait so that the server and
/// the prover can be handed a deterministic source in tests. Production code
/// must use [`SecureRng`]: a predictable challenge lets a prover forge
/// commitments, and a predictable nonce leaks the private exponent.
pub trait RandomSource: Send + Sync {
    /// Returns a value in `[low, high]`.
    fn uniform_inclusive(&self, low: &BigUint, high: &BigUint) -> Result<BigUint>;
}

/// Cryptographically secure random number generator.
///
/// This is a thin wrapper around `OsRng` that provides a consistent interface
/// for cryptographic randomness throughout the library.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecureRng(OsRng);

impl SecureRng {
    /// Creates a new cryptographically secure random number generator.
    pub fn new() -> Self {
        Self(OsRng)
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SecureRng {}

impl RandomSource for SecureRng {
    fn uniform_inclusive(&self, low: &BigUint, high: &BigUint) -> Result<BigUint> {
        if low > high {
            return Err(Error::Randomness(format!("empty range [{low}, {high}]")));
        }

        let mut rng = *self;
        Ok(rng.gen_biguint_range(low, &(high + 1u32)))
    }
}

/// Replays a fixed sequence of values, in order.
///
/// Intended for tests that need a known nonce or challenge. Each draw pops
/// the next value; running out, or a value outside the requested range, is
/// reported as [`Error::Randomness`].
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    values: Mutex<VecDeque<BigUint>>,
}

impl ScriptedRandom {
    /// Creates a source that yields `values` in order.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<BigUint>,
    {
        Self {
            values: Mutex::new(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Appends a value to the end of the script.
    pub fn push(&self, value: impl Into<BigUint>) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(value.into());
    }

    /// Number of values not yet drawn.
    pub fn remaining(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform_inclusive(&self, low: &BigUint, high: &BigUint) -> Result<BigUint> {
        let value = self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| Error::Randomness("scripted source exhausted".to_string()))?;

        if &value < low || &value > high {
            return Err(Error::Randomness(format!(
                "scripted value {value} outside [{low}, {high}]"
            )));
        }

        Ok(value)
    }
}

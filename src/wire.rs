//! Decimal-string encoding of protocol integers.
//!
//! Every integer on the wire (commitment, challenge, response, lhs, rhs,
//! public key, parameters) is a base-10 string so that values wider than any
//! native integer survive every client.

use num_bigint::BigUint;

use crate::{Error, Result};

/// Longest accepted decimal string. A 2048-bit value has 617 digits.
pub const MAX_DECIMAL_DIGITS: usize = 1024;

/// Renders `value` in base 10.
pub fn encode(value: &BigUint) -> String {
    value.to_str_radix(10)
}

/// Parses a base-10 unsigned integer.
///
/// Only ASCII digits are accepted: no sign, no whitespace, no separators.
/// `field` names the value in error messages.
pub fn decode(field: &str, text: &str) -> Result<BigUint> {
    if text.is_empty() {
        return Err(Error::InvalidEncoding(format!("{field} is empty")));
    }

    if text.len() > MAX_DECIMAL_DIGITS {
        return Err(Error::InvalidEncoding(format!(
            "{field} exceeds {MAX_DECIMAL_DIGITS} digits"
        )));
    }

    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidEncoding(format!(
            "{field} must be a decimal integer"
        )));
    }

    BigUint::parse_bytes(text.as_bytes(), 10)
        .ok_or_else(|| Error::InvalidEncoding(format!("{field} must be a decimal integer")))
}

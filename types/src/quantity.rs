//! Fixed-precision unsigned token quantities.
//!
//! A quantity carries the bit precision it was parsed under. Arithmetic is
//! only defined between quantities of equal precision and every result is
//! checked against that precision, so no operation wraps or panics.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuantityError;

/// Largest supported precision, in bits.
pub const MAX_PRECISION: u64 = 64;

/// Largest value representable under `precision` bits, i.e. `2^precision - 1`.
pub fn max_for_precision(precision: u64) -> Result<u64, QuantityError> {
    check_precision(precision)?;
    if precision == MAX_PRECISION {
        Ok(u64::MAX)
    } else {
        Ok((1u64 << precision) - 1)
    }
}

fn check_precision(precision: u64) -> Result<(), QuantityError> {
    match precision {
        0 => Err(QuantityError::ZeroPrecision),
        p if p > MAX_PRECISION => Err(QuantityError::PrecisionTooLarge(p)),
        _ => Ok(()),
    }
}

fn bit_len(value: u128) -> u64 {
    u64::from(128 - value.leading_zeros())
}

/// An unsigned amount bounded by `2^precision - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantity {
    value: u64,
    precision: u64,
}

impl Quantity {
    /// The zero quantity under `precision`.
    pub fn zero(precision: u64) -> Result<Self, QuantityError> {
        check_precision(precision)?;
        Ok(Self {
            value: 0,
            precision,
        })
    }

    pub fn from_u64(value: u64, precision: u64) -> Result<Self, QuantityError> {
        check_precision(precision)?;
        let bits = bit_len(u128::from(value));
        if bits > precision {
            return Err(QuantityError::PrecisionExceeded {
                input: value.to_string(),
                bits,
                precision,
            });
        }
        Ok(Self { value, precision })
    }

    /// Parse a decimal string, or a hex string prefixed with `0x`/`0X`.
    pub fn parse(input: &str, precision: u64) -> Result<Self, QuantityError> {
        check_precision(precision)?;
        let invalid = || QuantityError::InvalidInput {
            input: input.to_string(),
            precision,
        };

        let (digits, radix) = match input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (input, 10),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(invalid());
        }
        // Anything wider than 128 bits certainly exceeds the precision.
        let value = u128::from_str_radix(digits, radix).map_err(|_| {
            QuantityError::PrecisionExceeded {
                input: input.to_string(),
                bits: 129,
                precision,
            }
        })?;

        let bits = bit_len(value);
        if bits > precision {
            return Err(QuantityError::PrecisionExceeded {
                input: input.to_string(),
                bits,
                precision,
            });
        }
        Ok(Self {
            value: value as u64,
            precision,
        })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn precision(&self) -> u64 {
        self.precision
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    pub fn checked_add(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        self.same_precision(other)?;
        let overflow = QuantityError::Overflow {
            left: self.value,
            right: other.value,
            precision: self.precision,
        };
        let sum = self.value.checked_add(other.value).ok_or(overflow.clone())?;
        if bit_len(u128::from(sum)) > self.precision {
            return Err(overflow);
        }
        Ok(Quantity {
            value: sum,
            precision: self.precision,
        })
    }

    pub fn checked_sub(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        self.same_precision(other)?;
        let value = self
            .value
            .checked_sub(other.value)
            .ok_or(QuantityError::Underflow {
                left: self.value,
                right: other.value,
            })?;
        Ok(Quantity {
            value,
            precision: self.precision,
        })
    }

    /// Compare two quantities of the same precision.
    pub fn compare(&self, other: &Quantity) -> Result<Ordering, QuantityError> {
        self.same_precision(other)?;
        Ok(self.value.cmp(&other.value))
    }

    pub fn to_decimal(&self) -> String {
        self.value.to_string()
    }

    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.value)
    }

    fn same_precision(&self, other: &Quantity) -> Result<(), QuantityError> {
        if self.precision != other.precision {
            return Err(QuantityError::PrecisionMismatch {
                left: self.precision,
                right: other.precision,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

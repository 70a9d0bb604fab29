//! Error types for the leaf data model.

use thiserror::Error;

/// Errors raised while parsing or combining quantities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("precision must be larger than 0")]
    ZeroPrecision,

    #[error("precision [{0}] exceeds the maximum of 64")]
    PrecisionTooLarge(u64),

    #[error("invalid input [{input},{precision}]")]
    InvalidInput { input: String, precision: u64 },

    #[error("{input} has precision {bits} > {precision}")]
    PrecisionExceeded {
        input: String,
        bits: u64,
        precision: u64,
    },

    #[error("precision mismatch: {left} != {right}")]
    PrecisionMismatch { left: u64, right: u64 },

    #[error("{left} + {right} overflows precision {precision}")]
    Overflow {
        left: u64,
        right: u64,
        precision: u64,
    },

    #[error("{left} - {right} underflows")]
    Underflow { left: u64, right: u64 },
}

/// Errors for fixed-size byte types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

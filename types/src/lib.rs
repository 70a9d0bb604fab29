//! Fundamental types for the token transaction protocol.
//!
//! This crate defines the leaf types shared across every other crate in the
//! workspace: fixed-precision quantities, raw identities, token outputs and
//! their identifiers, key material, and timestamps.

pub mod error;
pub mod identity;
pub mod keys;
pub mod quantity;
pub mod time;
pub mod token;

pub use error::{QuantityError, TypesError};
pub use identity::Identity;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use quantity::{max_for_precision, Quantity, MAX_PRECISION};
pub use time::Timestamp;
pub use token::{Token, TokenId};

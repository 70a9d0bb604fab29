//! Cryptographic primitives for the token protocol.
//!
//! - **Ed25519** for plain-identity signatures
//! - **SHA-256** for HTLC images, setup hashes and token-request digests
//! - **Blake2b** as the alternative HTLC hash function

pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use error::CryptoError;
pub use hash::{blake2b_256, sha256};
pub use keys::{generate_keypair, keypair_from_seed};
pub use sign::{sign_message, verify_signature};

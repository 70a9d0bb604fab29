//! Raw identity bytes.
//!
//! An identity is opaque at this layer. Owner identities carry a type tag
//! and are decoded by the identity crate; issuer and auditor identities are
//! plain public keys.

use std::fmt;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

/// Opaque identity bytes.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(Vec<u8>);

impl Identity {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable, printable identifier derived from the identity bytes.
    pub fn unique_id(&self) -> String {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(&self.0);
        hex::encode(hasher.finalize())
    }
}

impl From<Vec<u8>> for Identity {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Identity {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = hex::encode(&self.0);
        if encoded.len() > 16 {
            write!(f, "{}..", &encoded[..16])
        } else {
            write!(f, "{encoded}")
        }
    }
}

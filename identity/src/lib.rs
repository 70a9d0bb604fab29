//! Owner identities and the verifiers that authorize spending them.
//!
//! Owner identities are a tagged envelope decoded into the closed [`Owner`]
//! enum. Verifiers are resolved through a table keyed by [`OwnerKind`];
//! HTLC scripts and multisig escrows resolve their nested identities through
//! the same table, so wrapping composes to any depth.

pub mod deserializer;
pub mod error;
pub mod htlc;
pub mod multisig;
pub mod plain;
pub mod typed;
pub mod verifier;

pub use deserializer::{
    Deserializer, OwnerDeserializer, OwnerResolver, TypedDeserializer, TypedVerifierDeserializer,
};
pub use error::IdentityError;
pub use htlc::{ClaimSignature, Encoding, HashFunction, HashInfo, HtlcSignature, Operation, Script};
pub use multisig::{MultiIdentity, MultiSignature};
pub use plain::PlainVerifier;
pub use typed::{Owner, OwnerKind, TypedIdentity};
pub use verifier::Verifier;

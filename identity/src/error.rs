//! Identity resolution and script errors.

use tessera_types::Timestamp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unknown identity type [{0}]")]
    UnknownType(String),

    #[error("malformed {kind} identity: {reason}")]
    Malformed { kind: &'static str, reason: String },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid htlc script: {0}")]
    InvalidScript(String),

    #[error("expiration date has already passed: deadline {deadline}, now {now}")]
    ScriptExpired { deadline: Timestamp, now: Timestamp },

    #[error("owner of output token does not correspond to the htlc {expected}")]
    OwnerMismatch { expected: &'static str },

    #[error("cannot find htlc {kind} key [{key}] in metadata")]
    MissingMetadata { kind: &'static str, key: String },

    #[error("htlc {kind} metadata under [{key}] does not match the script")]
    MetadataMismatch { kind: &'static str, key: String },

    #[error("expected number of signatures {expected}, got {actual}")]
    SignatureCount { expected: usize, actual: usize },
}

impl IdentityError {
    pub(crate) fn malformed(kind: &'static str, err: impl std::fmt::Display) -> Self {
        IdentityError::Malformed {
            kind,
            reason: err.to_string(),
        }
    }
}

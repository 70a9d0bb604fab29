//! Error types for the ledger capability, key namespace and translator.

use thiserror::Error;

/// Failure reported by a ledger backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("ledger backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("not a valid utf8 string: [{0:?}]")]
    InvalidUtf8(Vec<u8>),

    #[error("input contains reserved rune U+{rune:04X}: [{component}]")]
    ReservedRune { component: String, rune: u32 },

    #[error("not a composite key: [{0}]")]
    NotComposite(String),

    #[error("not a token key: [{0}]")]
    NotTokenKey(String),
}

#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("ledger {op} failed on [{key}]: {source}")]
    Ledger {
        op: &'static str,
        key: String,
        #[source]
        source: LedgerError,
    },

    #[error("token already exists: [{0}]")]
    TokenExists(String),

    #[error("input is already spent: [{0}]")]
    AlreadySpent(String),

    #[error("input [{0}] is spent more than once in this transaction")]
    DuplicateSpend(String),

    #[error("token request with same ID already exists: [{0}]")]
    DuplicateTokenRequest(String),

    #[error("entry with {kind} metadata key [{key}] is already occupied")]
    MetadataOccupied { kind: &'static str, key: String },

    #[error("output for key [{0}] does not exist")]
    MissingOutput(String),

    #[error("failed querying tokens: [{}]", .0.join("; "))]
    Query(Vec<String>),

    #[error("failed serializing action: {0}")]
    Serialization(String),
}

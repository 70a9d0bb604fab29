//! The key-value capability the translator writes through.
//!
//! Absence of a key is an empty value, never an error. Implementations
//! take `&self`; backends that mutate use interior mutability, so a
//! validator and a translator can share one handle.

use std::collections::BTreeMap;

use crate::error::LedgerError;

/// State metadata attached to a key.
pub type Metadata = BTreeMap<String, Vec<u8>>;

/// Read-only view of the ledger. Validation only ever sees this.
pub trait StateReader {
    fn get_state(&self, namespace: &str, key: &str) -> Result<Vec<u8>, LedgerError>;
    fn get_state_metadata(&self, namespace: &str, key: &str) -> Result<Metadata, LedgerError>;
}

pub trait Ledger: StateReader {
    fn set_state(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), LedgerError>;
    fn delete_state(&self, namespace: &str, key: &str) -> Result<(), LedgerError>;
    fn set_state_metadata(
        &self,
        namespace: &str,
        key: &str,
        metadata: &Metadata,
    ) -> Result<(), LedgerError>;
}

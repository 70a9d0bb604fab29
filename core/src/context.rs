//! Per-action validation state.

use std::collections::BTreeMap;

use tessera_identity::Deserializer;
use tessera_ledger::StateReader;
use tessera_types::Timestamp;

use crate::signature::SignatureProvider;
use crate::validator::Scheme;

/// Built fresh for every action (or, for auditing checks, for the request
/// as a whole) and dropped once its pipeline has run.
pub struct ValidationContext<'a, S: Scheme, A> {
    pub pp: &'a S::PublicParams,
    pub deserializer: &'a dyn Deserializer,
    pub signature_provider: &'a mut dyn SignatureProvider,
    pub ledger: &'a dyn StateReader,
    /// Namespace the ledger reads are scoped to.
    pub namespace: &'a str,
    /// Transaction id the request is bound to.
    pub anchor: &'a str,
    pub action: &'a A,
    /// Validation time; HTLC deadlines are evaluated against it.
    pub now: Timestamp,
    pub input_tokens: Vec<S::Input>,
    pub signatures: Vec<Vec<u8>>,
    pub metadata_counter: BTreeMap<String, usize>,
}

impl<S: Scheme, A> ValidationContext<'_, S, A> {
    /// Record that a check validated the metadata entry `key`.
    pub fn count_metadata_key(&mut self, key: impl Into<String>) {
        *self.metadata_counter.entry(key.into()).or_insert(0) += 1;
    }
}

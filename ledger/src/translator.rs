//! Check-then-commit translation of accepted actions into ledger writes.
//!
//! Every write goes through two phases. The check phase reads the ledger
//! and rejects the action if any output key is taken, any input is not
//! spendable, or any metadata key is occupied; nothing is written. The
//! commit phase then performs the writes. A failure during commit leaves
//! the ledger partially written and must abort the enclosing transaction.
//!
//! The check is only sound if no other transaction commits to overlapping
//! keys between this translator's check and commit; the embedding system
//! must serialize such transactions.

use std::collections::BTreeSet;

use tessera_crypto::sha256;
use tessera_types::TokenId;

use crate::action::{Action, IssueAction, SetupAction, TransferAction};
use crate::error::{KeyError, TranslatorError};
use crate::keys;
use crate::ledger::{Ledger, Metadata};

const SPENT_MARKER: &[u8] = b"true";
const REQUEST_HASH_METADATA: &str = "sha256";

pub struct Translator<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
    namespace: String,
    tx_id: String,
    counter: u64,
    spent_ids: Vec<String>,
    record_issued_history: bool,
}

impl<'a, L: Ledger + ?Sized> Translator<'a, L> {
    pub fn new(tx_id: impl Into<String>, ledger: &'a L, namespace: impl Into<String>) -> Self {
        Self {
            ledger,
            namespace: namespace.into(),
            tx_id: tx_id.into(),
            counter: 0,
            spent_ids: Vec::new(),
            record_issued_history: false,
        }
    }

    /// Also write every issued output under the issued-history prefix.
    pub fn with_issued_history(mut self, enabled: bool) -> Self {
        self.record_issued_history = enabled;
        self
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Index the next output of this transaction will be written at.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Ledger keys spent so far by this transaction.
    pub fn spent_ids(&self) -> &[String] {
        &self.spent_ids
    }

    /// Check and commit one accepted action.
    pub fn write(&mut self, action: Action<'_>) -> Result<(), TranslatorError> {
        tracing::debug!(tx_id = %self.tx_id, counter = self.counter, "checking transaction");
        self.check_process(action)?;

        tracing::debug!(tx_id = %self.tx_id, "committing transaction");
        self.commit_process(action).map_err(|e| {
            tracing::warn!(tx_id = %self.tx_id, error = %e, "failed committing transaction");
            e
        })
    }

    fn check_process(&self, action: Action<'_>) -> Result<(), TranslatorError> {
        match action {
            Action::Issue(issue) => self.check_issue(issue),
            Action::Transfer(transfer) => self.check_transfer(transfer),
            Action::Setup(_) => Ok(()),
        }
    }

    fn commit_process(&mut self, action: Action<'_>) -> Result<(), TranslatorError> {
        match action {
            Action::Issue(issue) => self.commit_issue(issue),
            Action::Transfer(transfer) => self.commit_transfer(transfer),
            Action::Setup(setup) => self.commit_setup(setup),
        }
    }

    fn check_issue(&self, issue: &dyn IssueAction) -> Result<(), TranslatorError> {
        for i in 0..issue.num_outputs() as u64 {
            self.ensure_token_absent(self.counter + i)?;
        }
        self.ensure_metadata_free(issue.metadata(), "issue", keys::issue_action_metadata_key)
    }

    fn check_transfer(&self, transfer: &dyn TransferAction) -> Result<(), TranslatorError> {
        let mut seen = BTreeSet::new();
        for key in self.input_keys(transfer)? {
            if !seen.insert(key.clone()) || self.spent_ids.contains(&key) {
                return Err(TranslatorError::DuplicateSpend(key.escape_default().to_string()));
            }
            let value = self.get(&key)?;
            // Direct mode keeps unspent outputs; serial-number mode marks spent ones.
            let spendable = if transfer.is_graph_hiding() {
                value.is_empty()
            } else {
                !value.is_empty()
            };
            if !spendable {
                return Err(TranslatorError::AlreadySpent(key.escape_default().to_string()));
            }
        }

        for i in 0..transfer.num_outputs() {
            if !transfer.is_redeem_at(i) {
                self.ensure_token_absent(self.counter + i as u64)?;
            }
        }
        self.ensure_metadata_free(
            transfer.metadata(),
            "transfer",
            keys::transfer_action_metadata_key,
        )
    }

    fn commit_issue(&mut self, issue: &dyn IssueAction) -> Result<(), TranslatorError> {
        let outputs = issue.serialized_outputs()?;
        for (i, output) in outputs.iter().enumerate() {
            let index = self.counter + i as u64;
            self.set(&keys::token_key(&self.tx_id, index)?, output)?;
            if self.record_issued_history {
                self.set(&keys::issued_history_key(&self.tx_id, index)?, output)?;
            }
        }
        self.commit_metadata(issue.metadata(), "issue", keys::issue_action_metadata_key)?;
        self.counter += outputs.len() as u64;
        Ok(())
    }

    fn commit_transfer(&mut self, transfer: &dyn TransferAction) -> Result<(), TranslatorError> {
        for i in 0..transfer.num_outputs() {
            if transfer.is_redeem_at(i) {
                continue;
            }
            let output = transfer.serialize_output_at(i)?;
            self.set(&keys::token_key(&self.tx_id, self.counter + i as u64)?, &output)?;
        }

        for key in self.input_keys(transfer)? {
            if transfer.is_graph_hiding() {
                self.set(&key, SPENT_MARKER)?;
            } else {
                self.delete(&key)?;
            }
            self.spent_ids.push(key);
        }

        self.commit_metadata(
            transfer.metadata(),
            "transfer",
            keys::transfer_action_metadata_key,
        )?;
        self.counter += transfer.num_outputs() as u64;
        Ok(())
    }

    fn commit_setup(&mut self, setup: &dyn SetupAction) -> Result<(), TranslatorError> {
        let raw = setup.public_parameters()?;
        self.set(&keys::setup_key()?, &raw)?;
        self.set(&keys::setup_hash_key()?, &sha256(&raw))?;
        tracing::debug!(tx_id = %self.tx_id, "public parameters updated");
        Ok(())
    }

    /// Record the raw token request, or only its SHA-256 when `store_hash`.
    ///
    /// Returns the digest when only the digest was stored.
    pub fn commit_token_request(
        &mut self,
        raw: &[u8],
        store_hash: bool,
    ) -> Result<Option<Vec<u8>>, TranslatorError> {
        let key = keys::token_request_key(&self.tx_id)?;
        if !self.get(&key)?.is_empty() {
            return Err(TranslatorError::DuplicateTokenRequest(self.tx_id.clone()));
        }

        let digest = sha256(raw).to_vec();
        if store_hash {
            self.set(&key, &digest)?;
            return Ok(Some(digest));
        }
        self.set(&key, raw)?;
        let metadata = Metadata::from([(REQUEST_HASH_METADATA.to_string(), digest)]);
        self.ledger
            .set_state_metadata(&self.namespace, &key, &metadata)
            .map_err(|source| TranslatorError::Ledger {
                op: "set_state_metadata",
                key: key.clone(),
                source,
            })?;
        Ok(None)
    }

    pub fn read_token_request(&self) -> Result<Vec<u8>, TranslatorError> {
        self.get(&keys::token_request_key(&self.tx_id)?)
    }

    /// SHA-256 of this transaction's token request, if one was committed.
    pub fn read_token_request_hash(&self) -> Result<Option<Vec<u8>>, TranslatorError> {
        let key = keys::token_request_key(&self.tx_id)?;
        let stored = self.get(&key)?;
        if stored.is_empty() {
            return Ok(None);
        }
        let metadata = self
            .ledger
            .get_state_metadata(&self.namespace, &key)
            .map_err(|source| TranslatorError::Ledger {
                op: "get_state_metadata",
                key: key.clone(),
                source,
            })?;
        Ok(Some(
            metadata
                .get(REQUEST_HASH_METADATA)
                .cloned()
                .unwrap_or(stored),
        ))
    }

    pub fn read_setup_parameters(&self) -> Result<Vec<u8>, TranslatorError> {
        self.get(&keys::setup_key()?)
    }

    pub fn read_setup_hash(&self) -> Result<Vec<u8>, TranslatorError> {
        self.get(&keys::setup_hash_key()?)
    }

    /// Fetch the serialized outputs for `ids`. Reports every failure, not
    /// only the first.
    pub fn query_tokens(&self, ids: &[TokenId]) -> Result<Vec<Vec<u8>>, TranslatorError> {
        let mut outputs = Vec::with_capacity(ids.len());
        let mut errors = Vec::new();
        for id in ids {
            let fetched = keys::token_key_for(id)
                .map_err(TranslatorError::from)
                .and_then(|key| {
                    let value = self.get(&key)?;
                    if value.is_empty() {
                        Err(TranslatorError::MissingOutput(key.escape_default().to_string()))
                    } else {
                        Ok(value)
                    }
                });
            match fetched {
                Ok(value) => outputs.push(value),
                Err(e) => errors.push(format!("{id}: {e}")),
            }
        }
        if !errors.is_empty() {
            return Err(TranslatorError::Query(errors));
        }
        Ok(outputs)
    }

    /// Whether each id has been spent. With `graph_hiding` the ids are serial
    /// numbers; otherwise they are token keys as built by [`keys::token_key`].
    pub fn are_tokens_spent(
        &self,
        ids: &[String],
        graph_hiding: bool,
    ) -> Result<Vec<bool>, TranslatorError> {
        ids.iter()
            .map(|id| {
                if graph_hiding {
                    Ok(!self.get(&keys::serial_number_key(id)?)?.is_empty())
                } else {
                    Ok(self.get(id)?.is_empty())
                }
            })
            .collect()
    }

    fn input_keys(&self, transfer: &dyn TransferAction) -> Result<Vec<String>, TranslatorError> {
        if transfer.is_graph_hiding() {
            transfer
                .serial_numbers()
                .iter()
                .map(|sn| keys::serial_number_key(sn).map_err(TranslatorError::from))
                .collect()
        } else {
            transfer
                .input_ids()
                .iter()
                .map(|id| keys::token_key_for(id).map_err(TranslatorError::from))
                .collect()
        }
    }

    fn ensure_token_absent(&self, index: u64) -> Result<(), TranslatorError> {
        let key = keys::token_key(&self.tx_id, index)?;
        if !self.get(&key)?.is_empty() {
            return Err(TranslatorError::TokenExists(key.escape_default().to_string()));
        }
        Ok(())
    }

    fn ensure_metadata_free(
        &self,
        metadata: &Metadata,
        kind: &'static str,
        make_key: fn(&str) -> Result<String, KeyError>,
    ) -> Result<(), TranslatorError> {
        for k in metadata.keys() {
            let key = make_key(k)?;
            if !self.get(&key)?.is_empty() {
                return Err(TranslatorError::MetadataOccupied { kind, key: k.clone() });
            }
        }
        Ok(())
    }

    fn commit_metadata(
        &self,
        metadata: &Metadata,
        kind: &'static str,
        make_key: fn(&str) -> Result<String, KeyError>,
    ) -> Result<(), TranslatorError> {
        for (k, value) in metadata {
            let key = make_key(k)?;
            if !self.get(&key)?.is_empty() {
                return Err(TranslatorError::MetadataOccupied { kind, key: k.clone() });
            }
            self.set(&key, value)?;
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, TranslatorError> {
        self.ledger
            .get_state(&self.namespace, key)
            .map_err(|source| TranslatorError::Ledger {
                op: "get_state",
                key: key.escape_default().to_string(),
                source,
            })
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), TranslatorError> {
        self.ledger
            .set_state(&self.namespace, key, value)
            .map_err(|source| TranslatorError::Ledger {
                op: "set_state",
                key: key.escape_default().to_string(),
                source,
            })
    }

    fn delete(&self, key: &str) -> Result<(), TranslatorError> {
        self.ledger
            .delete_state(&self.namespace, key)
            .map_err(|source| TranslatorError::Ledger {
                op: "delete_state",
                key: key.escape_default().to_string(),
                source,
            })
    }
}

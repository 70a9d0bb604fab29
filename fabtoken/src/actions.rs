//! Issue and transfer actions of the transparent scheme.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tessera_core::ValidationError;
use tessera_ledger::{Metadata, TranslatorError};
use tessera_types::{Identity, Token, TokenId};

/// Outputs are plain tokens; an output without owner is a redeem.
pub type Output = Token;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAction {
    pub issuer: Identity,
    pub outputs: Vec<Output>,
    pub metadata: Metadata,
}

impl IssueAction {
    pub fn new(issuer: Identity, outputs: Vec<Output>) -> Self {
        Self {
            issuer,
            outputs,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Structural checks: an issuer, at least one output, every output owned.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.issuer.is_none() {
            return Err(ValidationError::InvalidAction("issuer is not set".into()));
        }
        if self.outputs.is_empty() {
            return Err(ValidationError::NoOutputs);
        }
        for (i, output) in self.outputs.iter().enumerate() {
            if output.is_redeem() {
                return Err(ValidationError::InvalidAction(format!(
                    "issue output [{i}] has no owner"
                )));
            }
        }
        Ok(())
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self, ValidationError> {
        bincode::deserialize(raw).map_err(|e| ValidationError::MalformedAction(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        bincode::serialize(self).map_err(|e| ValidationError::MalformedAction(e.to_string()))
    }
}

impl tessera_ledger::IssueAction for IssueAction {
    fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    fn serialized_outputs(&self) -> Result<Vec<Vec<u8>>, TranslatorError> {
        self.outputs.iter().map(serialize_output).collect()
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// A spent token together with the id it was recorded under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInput {
    pub id: TokenId,
    pub input: Output,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAction {
    /// Required when any output is a redeem.
    pub issuer: Option<Identity>,
    pub inputs: Vec<TransferInput>,
    pub outputs: Vec<Output>,
    pub metadata: Metadata,
}

impl TransferAction {
    pub fn new(inputs: Vec<TransferInput>, outputs: Vec<Output>) -> Self {
        Self {
            issuer: None,
            inputs,
            outputs,
            metadata: Metadata::new(),
        }
    }

    pub fn with_issuer(mut self, issuer: Identity) -> Self {
        self.issuer = Some(issuer);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_redeem(&self) -> bool {
        self.outputs.iter().any(Token::is_redeem)
    }

    pub fn input_tokens(&self) -> impl Iterator<Item = &Output> {
        self.inputs.iter().map(|i| &i.input)
    }

    /// Structural checks: at least one input, distinct well-formed input
    /// ids, owned inputs, and at least one output.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.inputs.is_empty() {
            return Err(ValidationError::NoInputs);
        }
        let mut seen = BTreeSet::new();
        for input in &self.inputs {
            if input.id.tx_id.is_empty() {
                return Err(ValidationError::InvalidAction(format!(
                    "invalid input id {}: empty transaction id",
                    input.id
                )));
            }
            if !seen.insert(&input.id) {
                return Err(ValidationError::InvalidAction(format!(
                    "input {} appears more than once",
                    input.id
                )));
            }
            if input.input.is_redeem() {
                return Err(ValidationError::InvalidAction(format!(
                    "input {} has no owner",
                    input.id
                )));
            }
        }
        if self.outputs.is_empty() {
            return Err(ValidationError::NoOutputs);
        }
        Ok(())
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self, ValidationError> {
        bincode::deserialize(raw).map_err(|e| ValidationError::MalformedAction(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        bincode::serialize(self).map_err(|e| ValidationError::MalformedAction(e.to_string()))
    }
}

impl tessera_ledger::TransferAction for TransferAction {
    fn input_ids(&self) -> Vec<TokenId> {
        self.inputs.iter().map(|i| i.id.clone()).collect()
    }

    fn serial_numbers(&self) -> Vec<String> {
        Vec::new()
    }

    fn is_graph_hiding(&self) -> bool {
        false
    }

    fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    fn is_redeem_at(&self, index: usize) -> bool {
        self.outputs.get(index).is_some_and(Token::is_redeem)
    }

    fn serialize_output_at(&self, index: usize) -> Result<Vec<u8>, TranslatorError> {
        let output = self.outputs.get(index).ok_or_else(|| {
            TranslatorError::Serialization(format!("no output at index {index}"))
        })?;
        serialize_output(output)
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

fn serialize_output(output: &Output) -> Result<Vec<u8>, TranslatorError> {
    bincode::serialize(output).map_err(|e| TranslatorError::Serialization(e.to_string()))
}

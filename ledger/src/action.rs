//! What the translator needs to know about an accepted action.
//!
//! Schemes implement these traits for their concrete action types, so the
//! translator stays independent of how outputs are represented.

use tessera_types::TokenId;

use crate::error::TranslatorError;
use crate::ledger::Metadata;

pub trait IssueAction {
    fn num_outputs(&self) -> usize;
    /// Serialized outputs, in output order.
    fn serialized_outputs(&self) -> Result<Vec<Vec<u8>>, TranslatorError>;
    fn metadata(&self) -> &Metadata;
}

pub trait TransferAction {
    /// Ids of the spent tokens. Used when the graph is visible.
    fn input_ids(&self) -> Vec<TokenId>;
    /// Serial numbers of the spent tokens. Used when the graph is hidden.
    fn serial_numbers(&self) -> Vec<String>;
    fn is_graph_hiding(&self) -> bool;
    fn num_outputs(&self) -> usize;
    fn is_redeem_at(&self, index: usize) -> bool;
    fn serialize_output_at(&self, index: usize) -> Result<Vec<u8>, TranslatorError>;
    fn metadata(&self) -> &Metadata;
}

/// Installs or updates the public parameters of a namespace.
pub trait SetupAction {
    fn public_parameters(&self) -> Result<Vec<u8>, TranslatorError>;
}

/// An accepted action handed to [`crate::Translator::write`].
#[derive(Clone, Copy)]
pub enum Action<'a> {
    Issue(&'a dyn IssueAction),
    Transfer(&'a dyn TransferAction),
    Setup(&'a dyn SetupAction),
}

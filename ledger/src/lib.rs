//! Ledger access for the token protocol.
//!
//! - [`Ledger`] / [`StateReader`]: the key-value capability supplied by the
//!   embedding system
//! - [`keys`]: deterministic composite keys for every record the protocol
//!   writes
//! - [`Translator`]: turns accepted actions into ledger writes, checking
//!   every uniqueness and spend-once precondition before the first write

pub mod action;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod translator;

pub use action::{Action, IssueAction, SetupAction, TransferAction};
pub use error::{KeyError, LedgerError, TranslatorError};
pub use ledger::{Ledger, Metadata, StateReader};
pub use translator::Translator;

//! The transparent token scheme.
//!
//! Outputs travel in the clear: quantities are decimal strings, owners are
//! typed identities, and spent inputs are deleted from the ledger rather
//! than marked by serial number.

pub mod actions;
pub mod driver;
pub mod setup;
pub mod validator;

pub use actions::{IssueAction, Output, TransferAction, TransferInput};
pub use driver::FabTokenDriver;
pub use setup::{PublicParams, DRIVER_NAME, PROTOCOL_V1};
pub use validator::{new_validator, FabToken};

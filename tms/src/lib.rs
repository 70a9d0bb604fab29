//! Token management scope.
//!
//! A scope is one token namespace on one channel of one network. It owns
//! the driver registry and configuration, reads the namespace's public
//! parameters from the ledger, validates incoming token requests against
//! them, and translates accepted requests into ledger writes.

pub mod config;
pub mod error;
pub mod logging;
pub mod scope;

pub use config::{TmsConfig, TmsId};
pub use error::TmsError;
pub use logging::{init_logging, LogFormat};
pub use scope::{ProcessOutcome, TokenManagementScope};

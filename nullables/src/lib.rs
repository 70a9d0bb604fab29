//! Nullable infrastructure for deterministic testing.
//!
//! Everything the protocol takes from its surroundings (ledger, time,
//! signatures) has a stand-in here that:
//! - Returns deterministic values
//! - Can be controlled programmatically, including failure injection
//! - Never touches the filesystem or network

pub mod clock;
pub mod ledger;
pub mod signatures;
pub mod signer;

pub use clock::NullClock;
pub use ledger::{LedgerWrite, NullLedger};
pub use signatures::NullSignatureProvider;
pub use signer::{sha256_script, sign_request, Signing, TestSigner};

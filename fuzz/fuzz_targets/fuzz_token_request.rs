#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use tessera_fabtoken::{new_validator, PublicParams};
use tessera_identity::TypedDeserializer;
use tessera_nullables::NullLedger;
use tessera_types::Timestamp;

// Arbitrary request bytes must be rejected with an error, never a panic.
fuzz_target!(|data: &[u8]| {
    let Ok(pp) = PublicParams::setup(64) else {
        return;
    };
    let validator = new_validator(Arc::new(pp), Arc::new(TypedDeserializer::default()));
    let ledger = NullLedger::new();
    let _ = validator.verify_token_request_from_raw(&ledger, "ns", "tx", data, Timestamp::new(0));
});

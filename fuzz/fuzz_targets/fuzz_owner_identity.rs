#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_identity::{Deserializer, Owner, TypedDeserializer};
use tessera_types::Identity;

// Nested multisig and htlc payloads must hit the depth limit, not the stack.
fuzz_target!(|data: &[u8]| {
    let identity = Identity::new(data.to_vec());
    let _ = Owner::decode(&identity);

    let deserializer = TypedDeserializer::default();
    if let Ok(verifier) = deserializer.owner_verifier(&identity) {
        let _ = verifier.verify(b"message", data);
    }
    let _ = deserializer.recipients(&identity);
});

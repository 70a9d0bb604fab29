#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_core::DriverRegistry;
use tessera_fabtoken::{FabTokenDriver, PublicParams};

fuzz_target!(|data: &[u8]| {
    let _ = PublicParams::deserialize(data);

    let mut registry = DriverRegistry::new();
    if registry.register(Box::new(FabTokenDriver::default())).is_ok() {
        let _ = registry.new_validator(data);
    }
});

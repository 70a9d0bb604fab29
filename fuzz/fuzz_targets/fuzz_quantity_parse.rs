#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_types::Quantity;

fuzz_target!(|data: &[u8]| {
    let Some((&precision, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    if let Ok(q) = Quantity::parse(text, u64::from(precision)) {
        // Anything accepted must render back to an equal quantity.
        let again = Quantity::parse(&q.to_decimal(), q.precision()).ok();
        assert_eq!(again.map(|a| a.value()), Some(q.value()));
        let _ = q.checked_add(&q);
    }
});

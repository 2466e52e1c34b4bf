#![no_main]

use libfuzzer_sys::fuzz_target;

use trinary_types::TRANSACTION_TRITS;
use trinary_work::{pow_weight, validate_pow};

fuzz_target!(|data: &[u8]| {
    // First byte selects the weight; the rest seeds the transaction trits.
    let Some((&mwm, rest)) = data.split_first() else {
        return;
    };
    let mwm = mwm as usize;

    // Arbitrary-length, arbitrary-value input must never panic.
    let raw: Vec<i8> = rest.iter().map(|&b| b as i8).collect();
    let _ = validate_pow(&raw, mwm);

    if rest.is_empty() {
        return;
    }
    let tx: Vec<i8> = (0..TRANSACTION_TRITS)
        .map(|i| (rest[i % rest.len()] % 3) as i8 - 1)
        .collect();
    let weight = pow_weight(&tx).expect("well-formed transaction");
    assert_eq!(validate_pow(&tx, mwm), mwm <= weight);
});

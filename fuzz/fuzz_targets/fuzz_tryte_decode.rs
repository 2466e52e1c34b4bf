#![no_main]

use libfuzzer_sys::fuzz_target;

use trinary_types::{trits_from_trytes, trytes_from_trits};

// Decoding arbitrary text never panics, and whatever decodes re-encodes to
// the same string.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(trits) = trits_from_trytes(text) {
        assert_eq!(trits.len(), text.len() * 3);
        let encoded = trytes_from_trits(&trits).expect("decoded trits re-encode");
        assert_eq!(encoded, text);
    }

    // Raw bytes reinterpreted as trits must be rejected cleanly when invalid.
    let trits: Vec<i8> = data.iter().map(|&b| b as i8).collect();
    let _ = trytes_from_trits(&trits);
});

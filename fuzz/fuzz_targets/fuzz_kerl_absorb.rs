#![no_main]

use libfuzzer_sys::fuzz_target;

use trinary_crypto::{Kerl, Sponge};

// Any 243-trit chunk (including values at and beyond the 242-trit range)
// hashes without panicking, and the output's last trit is always zero.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let chunks = (data.len() + 242) / 243;
    let trits: Vec<i8> = (0..chunks * 243)
        .map(|i| (data[i % data.len()] % 3) as i8 - 1)
        .collect();

    let hash = Kerl::new().hash(&trits).expect("aligned input hashes");
    assert_eq!(hash.as_trits()[242], 0);
    assert_eq!(Kerl::new().hash(&trits).expect("aligned input hashes"), hash);
});

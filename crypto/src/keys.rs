//! Seed -> subseed -> private key derivation.

use zeroize::Zeroize;

use trinary_types::{
    add_assign_value, PrivateKey, Result, SecurityLevel, Seed, Subseed, TernaryError, Trit,
    HASH_TRITS, HASH_TRYTES, TRYTE_ALPHABET,
};

use crate::sponge::Sponge;

/// Advance the seed by `index` (balanced-ternary addition, equivalent to
/// `index` increments), absorb it and squeeze 243 trits.
pub fn subseed<S: Sponge>(sponge: &mut S, seed: &Seed, index: u64) -> Result<Subseed> {
    let offset = i64::try_from(index).map_err(|_| {
        TernaryError::InvalidParameter(format!("key index {index} exceeds {}", i64::MAX))
    })?;
    let mut advanced = *seed.as_trits();
    add_assign_value(&mut advanced, offset);

    let mut out = [0 as Trit; HASH_TRITS];
    let result = sponge.digest_into(&advanced, &mut out);
    advanced.zeroize();
    result?;
    let subseed = Subseed::new(out);
    out.zeroize();
    Ok(subseed)
}

/// Absorb the subseed and squeeze `27 * security` key segments.
pub fn private_key<S: Sponge>(
    sponge: &mut S,
    subseed: &Subseed,
    security: SecurityLevel,
) -> Result<PrivateKey> {
    let mut trits = vec![0 as Trit; security.key_trits()];
    sponge.digest_into(subseed.as_trits(), &mut trits)?;
    PrivateKey::new(trits, security)
}

/// Generate a random seed from the operating system's entropy source.
pub fn generate_seed() -> Result<Seed> {
    let mut trytes = String::with_capacity(HASH_TRYTES);
    let mut buffer = [0u8; 64];
    while trytes.len() < HASH_TRYTES {
        getrandom::getrandom(&mut buffer).map_err(|e| TernaryError::Entropy(e.to_string()))?;
        // 243 = 9 * 27; rejecting larger bytes keeps the distribution uniform.
        for &byte in buffer.iter().filter(|&&b| b < 243) {
            if trytes.len() == HASH_TRYTES {
                break;
            }
            trytes.push(TRYTE_ALPHABET[(byte % 27) as usize] as char);
        }
    }
    buffer.zeroize();
    let seed = Seed::from_trytes(&trytes);
    trytes.zeroize();
    seed
}

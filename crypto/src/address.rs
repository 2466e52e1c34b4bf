//! Key digests and addresses.
//!
//! Every 243-trit key segment is hashed 26 times (the full hash chain), the 27
//! chain ends of a fragment are hashed into a fragment digest, and the digests
//! of all fragments are hashed once more into the address.

use zeroize::Zeroize;

use trinary_types::{
    PrivateKey, Result, TernaryError, Trit, TritHash, FRAGMENT_TRITS, HASH_TRITS,
};

use crate::sponge::Sponge;

/// Length of each segment's hash chain.
pub const CHAIN_LENGTH: usize = 26;

/// Hash a segment in place `rounds` times, resetting the sponge each time.
pub(crate) fn hash_chain<S: Sponge>(
    sponge: &mut S,
    segment: &mut [Trit],
    rounds: usize,
) -> Result<()> {
    for _ in 0..rounds {
        sponge.reset();
        sponge.absorb(segment)?;
        sponge.squeeze(segment)?;
    }
    Ok(())
}

/// One 243-trit digest per key fragment, concatenated.
pub fn digests<S: Sponge>(sponge: &mut S, key: &PrivateKey) -> Result<Vec<Trit>> {
    let mut out = vec![0 as Trit; key.security().fragments() * HASH_TRITS];
    let mut buffer = [0 as Trit; FRAGMENT_TRITS];
    let result = key
        .fragments()
        .zip(out.chunks_exact_mut(HASH_TRITS))
        .try_for_each(|(fragment, digest)| {
            buffer.copy_from_slice(fragment);
            for segment in buffer.chunks_exact_mut(HASH_TRITS) {
                hash_chain(sponge, segment, CHAIN_LENGTH)?;
            }
            sponge.digest_into(&buffer, digest)
        });
    buffer.zeroize();
    result.map(|()| out)
}

/// Hash concatenated fragment digests into an address.
pub fn address_from_digests<S: Sponge>(sponge: &mut S, digests: &[Trit]) -> Result<TritHash> {
    let fragments = digests.len() / HASH_TRITS;
    if digests.len() % HASH_TRITS != 0 || !(1..=3).contains(&fragments) {
        return Err(TernaryError::InvalidLength {
            expected: "243, 486 or 729".into(),
            actual: digests.len(),
        });
    }
    sponge.hash(digests)
}

/// Address of a private key.
pub fn address<S: Sponge>(sponge: &mut S, key: &PrivateKey) -> Result<TritHash> {
    let digests = digests(sponge, key)?;
    address_from_digests(sponge, &digests)
}

//! One-time signatures over normalized bundle hashes.
//!
//! Segment `j` of a key fragment is hashed `13 - d_j` times for digit `d_j`.
//! A verifier finishes each chain with `13 + d_j` more hashes, recovering the
//! fragment digest and therefore the address.

use trinary_types::{
    PrivateKey, Result, TernaryError, Trit, TritHash, FRAGMENT_TRITS, HASH_TRITS,
    SEGMENTS_PER_FRAGMENT,
};

use crate::address::{address_from_digests, hash_chain};
use crate::normalize::{normalize, NormalizedBundle, MAX_DIGIT};
use crate::sponge::Sponge;

fn check_fragment(normalized_fragment: &[i8], fragment: &[Trit]) -> Result<()> {
    if normalized_fragment.len() != SEGMENTS_PER_FRAGMENT {
        return Err(TernaryError::length(
            SEGMENTS_PER_FRAGMENT,
            normalized_fragment.len(),
        ));
    }
    if fragment.len() != FRAGMENT_TRITS {
        return Err(TernaryError::length(FRAGMENT_TRITS, fragment.len()));
    }
    if let Some(&bad) = normalized_fragment.iter().find(|d| !(-13..=13).contains(*d)) {
        return Err(TernaryError::InvalidParameter(format!(
            "normalized digit {bad} outside [-13, 13]"
        )));
    }
    Ok(())
}

/// Sign one 6561-trit key fragment with 27 normalized digits.
pub fn signature_fragment<S: Sponge>(
    sponge: &mut S,
    normalized_fragment: &[i8],
    key_fragment: &[Trit],
) -> Result<Vec<Trit>> {
    check_fragment(normalized_fragment, key_fragment)?;
    let mut signature = key_fragment.to_vec();
    for (segment, &digit) in signature
        .chunks_exact_mut(HASH_TRITS)
        .zip(normalized_fragment)
    {
        hash_chain(sponge, segment, (MAX_DIGIT - digit) as usize)?;
    }
    Ok(signature)
}

/// Sign a normalized bundle hash: one signature fragment per key fragment.
pub fn signature<S: Sponge>(
    sponge: &mut S,
    key: &PrivateKey,
    normalized: &NormalizedBundle,
) -> Result<Vec<Trit>> {
    let mut out = Vec::with_capacity(key.security().key_trits());
    for (index, fragment) in key.fragments().enumerate() {
        out.extend(signature_fragment(
            sponge,
            normalized.fragment(index),
            fragment,
        )?);
    }
    Ok(out)
}

/// Complete the hash chains of a signature fragment and digest the result.
pub fn digest_from_signature<S: Sponge>(
    sponge: &mut S,
    normalized_fragment: &[i8],
    signature_fragment: &[Trit],
) -> Result<TritHash> {
    check_fragment(normalized_fragment, signature_fragment)?;
    let mut buffer = signature_fragment.to_vec();
    for (segment, &digit) in buffer.chunks_exact_mut(HASH_TRITS).zip(normalized_fragment) {
        hash_chain(sponge, segment, (MAX_DIGIT + digit) as usize)?;
    }
    sponge.hash(&buffer)
}

/// Check that `signature` signs `bundle_hash` for `address`.
///
/// The number of signature fragments determines the security level.
pub fn verify<S: Sponge>(
    sponge: &mut S,
    address: &TritHash,
    signature: &[Trit],
    bundle_hash: &TritHash,
) -> Result<bool> {
    let fragments = signature.len() / FRAGMENT_TRITS;
    if signature.len() % FRAGMENT_TRITS != 0 || !(1..=3).contains(&fragments) {
        return Err(TernaryError::InvalidLength {
            expected: "6561, 13122 or 19683".into(),
            actual: signature.len(),
        });
    }
    let normalized = normalize(bundle_hash);
    let mut digests = Vec::with_capacity(fragments * HASH_TRITS);
    for (index, fragment) in signature.chunks_exact(FRAGMENT_TRITS).enumerate() {
        let digest = digest_from_signature(sponge, normalized.fragment(index), fragment)?;
        digests.extend_from_slice(digest.as_trits());
    }
    Ok(address_from_digests(sponge, &digests)? == *address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{address, digests};
    use crate::kerl::Kerl;
    use trinary_types::SecurityLevel;

    fn key(security: SecurityLevel) -> PrivateKey {
        let trits = (0..security.key_trits())
            .map(|i| ((i * 13 + 2) % 3) as i8 - 1)
            .collect();
        PrivateKey::new(trits, security).unwrap()
    }

    fn bundle(fill: i8) -> TritHash {
        let mut trits = [0i8; HASH_TRITS];
        for (i, t) in trits.iter_mut().enumerate() {
            *t = if i % 5 == 0 { fill } else { ((i % 3) as i8) - 1 };
        }
        TritHash::new(trits)
    }

    #[test]
    fn signature_length_is_6561_per_level() {
        let normalized = normalize(&bundle(1));
        for level in SecurityLevel::ALL {
            let sig = signature(&mut Kerl::new(), &key(level), &normalized).unwrap();
            assert_eq!(sig.len(), 6561 * level.fragments());
        }
    }

    #[test]
    fn signature_verifies_against_address() {
        let key = key(SecurityLevel::Medium);
        let addr = address(&mut Kerl::new(), &key).unwrap();
        let hash = bundle(-1);
        let sig = signature(&mut Kerl::new(), &key, &normalize(&hash)).unwrap();
        assert!(verify(&mut Kerl::new(), &addr, &sig, &hash).unwrap());
    }

    #[test]
    fn signature_fails_for_other_bundle() {
        let key = key(SecurityLevel::Low);
        let addr = address(&mut Kerl::new(), &key).unwrap();
        let sig = signature(&mut Kerl::new(), &key, &normalize(&bundle(1))).unwrap();
        assert!(!verify(&mut Kerl::new(), &addr, &sig, &bundle(-1)).unwrap());
    }

    #[test]
    fn recovered_digest_matches_key_digest() {
        let key = key(SecurityLevel::Low);
        let key_digests = digests(&mut Kerl::new(), &key).unwrap();
        let normalized = normalize(&bundle(0));
        let sig = signature(&mut Kerl::new(), &key, &normalized).unwrap();
        let recovered = digest_from_signature(&mut Kerl::new(), normalized.fragment(0), &sig).unwrap();
        assert_eq!(recovered.as_trits()[..], key_digests[..]);
    }

    #[test]
    fn digit_13_reveals_the_key_segment() {
        let key = key(SecurityLevel::Low);
        let mut digits = [0i8; 27];
        digits[0] = 13;
        digits[1] = -13;
        let sig = signature_fragment(&mut Kerl::new(), &digits, key.as_trits()).unwrap();
        assert_eq!(sig[..HASH_TRITS], key.as_trits()[..HASH_TRITS]);
        assert_ne!(sig[HASH_TRITS..2 * HASH_TRITS], key.as_trits()[HASH_TRITS..2 * HASH_TRITS]);
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let key = key(SecurityLevel::Low);
        assert!(signature_fragment(&mut Kerl::new(), &[0; 26], key.as_trits()).is_err());
        assert!(signature_fragment(&mut Kerl::new(), &[0; 27], &key.as_trits()[..243]).is_err());
        assert!(signature_fragment(&mut Kerl::new(), &[14; 27], key.as_trits()).is_err());
        assert!(verify(&mut Kerl::new(), &TritHash::ZERO, &[0; 100], &TritHash::ZERO).is_err());
    }
}

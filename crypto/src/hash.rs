//! Transaction and bundle hashing.

use trinary_types::{
    Result, TernaryError, Transaction, Trit, TritHash, ESSENCE_TRITS, TRANSACTION_TRITS,
};

use crate::curl::{Curl, CurlRounds};
use crate::kerl::Kerl;
use crate::sponge::Sponge;

/// Curl-P-81 hash of a serialized transaction.
pub fn transaction_hash(trits: &[Trit]) -> Result<TritHash> {
    if trits.len() != TRANSACTION_TRITS {
        return Err(TernaryError::length(TRANSACTION_TRITS, trits.len()));
    }
    Curl::new(CurlRounds::P81).hash(trits)
}

/// Hash of a transaction given as 2673 trytes, rendered as 81 trytes.
pub fn digest_trytes(trytes: &str) -> Result<String> {
    let transaction = Transaction::from_trytes(trytes)?;
    Ok(transaction_hash(transaction.as_trits())?.to_trytes())
}

/// Kerl hash of a bundle essence (486 trits per transaction).
pub fn bundle_hash(essence: &[Trit]) -> Result<TritHash> {
    if essence.is_empty() || essence.len() % ESSENCE_TRITS != 0 {
        return Err(TernaryError::multiple_of(ESSENCE_TRITS, essence.len()));
    }
    Kerl::new().hash(essence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trinary_types::TRANSACTION_TRYTES;

    #[test]
    fn transaction_hash_requires_full_width() {
        assert!(transaction_hash(&[0; TRANSACTION_TRITS]).is_ok());
        assert!(matches!(
            transaction_hash(&[0; 243]),
            Err(TernaryError::InvalidLength { actual: 243, .. })
        ));
    }

    #[test]
    fn digest_trytes_matches_trit_api() {
        let trytes = "9".repeat(TRANSACTION_TRYTES);
        let expected = transaction_hash(&[0; TRANSACTION_TRITS]).unwrap();
        assert_eq!(digest_trytes(&trytes).unwrap(), expected.to_trytes());
        assert_eq!(digest_trytes(&trytes).unwrap().len(), 81);
    }

    #[test]
    fn digest_trytes_rejects_bad_input() {
        assert!(digest_trytes("ABC").is_err());
        let mut trytes = "9".repeat(TRANSACTION_TRYTES - 1);
        trytes.push('!');
        assert!(matches!(
            digest_trytes(&trytes),
            Err(TernaryError::InvalidAlphabet { ch: '!', .. })
        ));
    }

    #[test]
    fn bundle_hash_needs_whole_essence_entries() {
        assert!(bundle_hash(&[0; ESSENCE_TRITS * 2]).is_ok());
        assert!(bundle_hash(&[0; ESSENCE_TRITS - 243]).is_err());
        assert!(bundle_hash(&[]).is_err());
    }
}

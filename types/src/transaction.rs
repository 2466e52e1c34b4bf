//! Transaction wire layout and the proof-of-work nonce.

use std::fmt;
use std::ops::Range;

use crate::error::{Result, TernaryError};
use crate::hash::{TritHash, HASH_TRITS};
use crate::trit::{validate_trits, Trit};
use crate::trytes::{trits_from_trytes, trytes_from_trits, TRYTE_ALPHABET};

/// Trits in a serialized transaction.
pub const TRANSACTION_TRITS: usize = 8019;

/// Trytes in a serialized transaction.
pub const TRANSACTION_TRYTES: usize = TRANSACTION_TRITS / 3;

/// Trits in the proof-of-work nonce.
pub const NONCE_TRITS: usize = 81;

/// Trits in a bundle essence entry for one transaction.
pub const ESSENCE_TRITS: usize = 486;

/// Trit offsets of the transaction fields.
pub mod layout {
    use std::ops::Range;

    pub const SIGNATURE: Range<usize> = 0..6561;
    pub const ADDRESS: Range<usize> = 6561..6804;
    pub const VALUE: Range<usize> = 6804..6885;
    pub const OBSOLETE_TAG: Range<usize> = 6885..6966;
    pub const TIMESTAMP: Range<usize> = 6966..6993;
    pub const CURRENT_INDEX: Range<usize> = 6993..7020;
    pub const LAST_INDEX: Range<usize> = 7020..7047;
    pub const BUNDLE: Range<usize> = 7047..7290;
    pub const TRUNK: Range<usize> = 7290..7533;
    pub const BRANCH: Range<usize> = 7533..7776;
    pub const TAG: Range<usize> = 7776..7857;
    pub const ATTACHMENT_TIMESTAMP: Range<usize> = 7857..7884;
    pub const ATTACHMENT_LOWER_BOUND: Range<usize> = 7884..7911;
    pub const ATTACHMENT_UPPER_BOUND: Range<usize> = 7911..7938;
    pub const NONCE: Range<usize> = 7938..8019;

    /// Address through last index: the part of each transaction that is signed.
    pub const ESSENCE: Range<usize> = ADDRESS.start..LAST_INDEX.end;

    /// Offset of the obsolete tag inside one essence entry.
    pub const ESSENCE_OBSOLETE_TAG: Range<usize> =
        (OBSOLETE_TAG.start - ADDRESS.start)..(OBSOLETE_TAG.end - ADDRESS.start);
}

/// The 81-trit proof-of-work nonce.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([Trit; NONCE_TRITS]);

impl Nonce {
    pub const fn new(trits: [Trit; NONCE_TRITS]) -> Self {
        Self(trits)
    }

    pub fn as_trits(&self) -> &[Trit; NONCE_TRITS] {
        &self.0
    }

    pub fn to_trytes(&self) -> String {
        self.0
            .chunks_exact(3)
            .map(|t| TRYTE_ALPHABET[((t[0] + 3 * t[1] + 9 * t[2]) + 27) as usize % 27] as char)
            .collect()
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.to_trytes())
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_trytes())
    }
}

/// A serialized transaction of exactly 8019 trits.
#[derive(Clone, PartialEq, Eq)]
pub struct Transaction {
    trits: Vec<Trit>,
}

impl Transaction {
    pub fn from_trits(trits: Vec<Trit>) -> Result<Self> {
        if trits.len() != TRANSACTION_TRITS {
            return Err(TernaryError::length(TRANSACTION_TRITS, trits.len()));
        }
        validate_trits(&trits)?;
        Ok(Self { trits })
    }

    pub fn from_trytes(trytes: &str) -> Result<Self> {
        if trytes.len() != TRANSACTION_TRYTES {
            return Err(TernaryError::length(TRANSACTION_TRYTES, trytes.len()));
        }
        Ok(Self {
            trits: trits_from_trytes(trytes)?,
        })
    }

    pub fn as_trits(&self) -> &[Trit] {
        &self.trits
    }

    pub fn into_trits(self) -> Vec<Trit> {
        self.trits
    }

    pub fn to_trytes(&self) -> String {
        // Length and values were validated on construction.
        trytes_from_trits(&self.trits).unwrap_or_default()
    }

    pub fn field(&self, range: Range<usize>) -> &[Trit] {
        &self.trits[range]
    }

    pub fn nonce(&self) -> Nonce {
        let mut nonce = [0; NONCE_TRITS];
        nonce.copy_from_slice(&self.trits[layout::NONCE]);
        Nonce(nonce)
    }

    pub fn set_nonce(&mut self, nonce: &Nonce) {
        self.trits[layout::NONCE].copy_from_slice(nonce.as_trits());
    }

    pub fn set_trunk(&mut self, trunk: &TritHash) {
        self.trits[layout::TRUNK].copy_from_slice(trunk.as_trits());
    }

    pub fn set_branch(&mut self, branch: &TritHash) {
        self.trits[layout::BRANCH].copy_from_slice(branch.as_trits());
    }

    pub fn trunk(&self) -> TritHash {
        let mut trits = [0; HASH_TRITS];
        trits.copy_from_slice(&self.trits[layout::TRUNK]);
        TritHash::new(trits)
    }

    pub fn branch(&self) -> TritHash {
        let mut trits = [0; HASH_TRITS];
        trits.copy_from_slice(&self.trits[layout::BRANCH]);
        TritHash::new(trits)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transaction(nonce={})", self.nonce())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_contiguous() {
        let fields = [
            layout::SIGNATURE,
            layout::ADDRESS,
            layout::VALUE,
            layout::OBSOLETE_TAG,
            layout::TIMESTAMP,
            layout::CURRENT_INDEX,
            layout::LAST_INDEX,
            layout::BUNDLE,
            layout::TRUNK,
            layout::BRANCH,
            layout::TAG,
            layout::ATTACHMENT_TIMESTAMP,
            layout::ATTACHMENT_LOWER_BOUND,
            layout::ATTACHMENT_UPPER_BOUND,
            layout::NONCE,
        ];
        let mut expected_start = 0;
        for field in fields {
            assert_eq!(field.start, expected_start);
            expected_start = field.end;
        }
        assert_eq!(expected_start, TRANSACTION_TRITS);
        assert_eq!(layout::ESSENCE.len(), ESSENCE_TRITS);
        assert_eq!(layout::ESSENCE_OBSOLETE_TAG, 324..405);
    }

    #[test]
    fn trunk_and_branch_setters() {
        let mut tx = Transaction::from_trits(vec![0; TRANSACTION_TRITS]).unwrap();
        let trunk = TritHash::new([1; HASH_TRITS]);
        let branch = TritHash::new([-1; HASH_TRITS]);
        tx.set_trunk(&trunk);
        tx.set_branch(&branch);
        assert_eq!(tx.trunk(), trunk);
        assert_eq!(tx.branch(), branch);
        assert!(tx.field(layout::TAG).iter().all(|&t| t == 0));
    }

    #[test]
    fn tryte_width_is_enforced() {
        assert!(Transaction::from_trytes(&"9".repeat(TRANSACTION_TRYTES)).is_ok());
        assert!(Transaction::from_trytes(&"9".repeat(81)).is_err());
    }

    #[test]
    fn nonce_round_trip() {
        let mut tx = Transaction::from_trits(vec![0; TRANSACTION_TRITS]).unwrap();
        let nonce = Nonce::new([1; NONCE_TRITS]);
        tx.set_nonce(&nonce);
        assert_eq!(tx.nonce(), nonce);
        assert_eq!(nonce.to_trytes(), "M".repeat(27));
        assert!(tx.to_trytes().ends_with(&"M".repeat(27)));
    }
}

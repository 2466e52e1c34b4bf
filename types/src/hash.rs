//! Fixed-width 243-trit hash.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TernaryError};
use crate::trit::{validate_trits, Trit};
use crate::trytes::{trits_from_trytes_into, TRYTE_ALPHABET};

/// Number of trits in a hash (the sponge rate).
pub const HASH_TRITS: usize = 243;

/// Number of trytes in a rendered hash.
pub const HASH_TRYTES: usize = HASH_TRITS / 3;

/// A 243-trit hash: transaction hashes, bundle hashes, addresses, digests.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TritHash([Trit; HASH_TRITS]);

impl TritHash {
    pub const ZERO: Self = Self([0; HASH_TRITS]);

    /// Wrap raw trits. The caller guarantees each value is a trit.
    pub const fn new(trits: [Trit; HASH_TRITS]) -> Self {
        Self(trits)
    }

    /// Copy a slice of exactly 243 valid trits.
    pub fn from_trits(trits: &[Trit]) -> Result<Self> {
        let array: [Trit; HASH_TRITS] = trits
            .try_into()
            .map_err(|_| TernaryError::length(HASH_TRITS, trits.len()))?;
        validate_trits(&array)?;
        Ok(Self(array))
    }

    /// Parse exactly 81 trytes.
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        if trytes.len() != HASH_TRYTES {
            return Err(TernaryError::length(HASH_TRYTES, trytes.len()));
        }
        let mut trits = [0; HASH_TRITS];
        trits_from_trytes_into(trytes, &mut trits)?;
        Ok(Self(trits))
    }

    pub fn as_trits(&self) -> &[Trit; HASH_TRITS] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&t| t == 0)
    }

    /// Number of trailing zero trits (the proof-of-work weight).
    pub fn trailing_zeros(&self) -> usize {
        self.0.iter().rev().take_while(|&&t| t == 0).count()
    }

    /// Render as 81 trytes.
    pub fn to_trytes(&self) -> String {
        self.0
            .chunks_exact(3)
            .map(|t| TRYTE_ALPHABET[((t[0] + 3 * t[1] + 9 * t[2]) + 27) as usize % 27] as char)
            .collect()
    }
}

impl AsRef<[Trit]> for TritHash {
    fn as_ref(&self) -> &[Trit] {
        &self.0
    }
}

impl Default for TritHash {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for TritHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TritHash({}…)", &self.to_trytes()[..9])
    }
}

impl fmt::Display for TritHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_trytes())
    }
}

impl FromStr for TritHash {
    type Err = TernaryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_trytes(s)
    }
}

impl Serialize for TritHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_trytes())
    }
}

impl<'de> Deserialize<'de> for TritHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let trytes = String::deserialize(deserializer)?;
        Self::from_trytes(&trytes).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hash_renders_as_nines() {
        assert_eq!(TritHash::ZERO.to_trytes(), "9".repeat(81));
        assert!(TritHash::ZERO.is_zero());
        assert_eq!(TritHash::ZERO.trailing_zeros(), 243);
    }

    #[test]
    fn trailing_zeros_counts_from_the_end() {
        let mut trits = [0i8; HASH_TRITS];
        trits[200] = 1;
        assert_eq!(TritHash::new(trits).trailing_zeros(), 42);
    }

    #[test]
    fn tryte_round_trip() {
        let trytes = "ABCDEFGHIJKLMNOPQRSTUVWXYZ9".repeat(3);
        let hash: TritHash = trytes.parse().unwrap();
        assert_eq!(hash.to_string(), trytes);
    }

    #[test]
    fn wrong_width_is_rejected() {
        assert!(TritHash::from_trytes("ABC").is_err());
        assert!(TritHash::from_trits(&[0; 242]).is_err());
        assert!(TritHash::from_trits(&[2; 243]).is_err());
    }

    #[test]
    fn serde_uses_trytes() {
        let hash = TritHash::from_trytes(&"Z".repeat(81)).unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "Z".repeat(81)));
        let back: TritHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}

//! Signature security levels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TernaryError;

/// Trits in one key fragment (27 segments of 243 trits).
pub const FRAGMENT_TRITS: usize = 6561;

/// Segments per key fragment.
pub const SEGMENTS_PER_FRAGMENT: usize = 27;

/// Number of key fragments, each adding 6561 trits of key and signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SecurityLevel {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl SecurityLevel {
    pub const ALL: [SecurityLevel; 3] = [Self::Low, Self::Medium, Self::High];

    /// Number of key fragments.
    pub fn fragments(self) -> usize {
        self as usize
    }

    /// Number of 243-trit key segments.
    pub fn segments(self) -> usize {
        self.fragments() * SEGMENTS_PER_FRAGMENT
    }

    /// Length of a private key or signature at this level.
    pub fn key_trits(self) -> usize {
        self.fragments() * FRAGMENT_TRITS
    }
}

impl Default for SecurityLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = TernaryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(TernaryError::InvalidParameter(format!(
                "security level {other} outside 1..=3"
            ))),
        }
    }
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> Self {
        level as u8
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

//! Error taxonomy shared by every crate that handles ternary data.

use thiserror::Error;

/// Common error type for ternary encoding, hashing and searching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TernaryError {
    #[error("invalid tryte character {ch:?} at position {position}")]
    InvalidAlphabet { ch: char, position: usize },

    #[error("invalid trit value {value} at position {position}")]
    InvalidTrit { value: i8, position: usize },

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: String, actual: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("search exhausted after {evaluated} candidates without meeting the threshold")]
    SearchExhausted { evaluated: u64 },
}

impl TernaryError {
    /// Shorthand for a fixed-width length violation.
    pub fn length(expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            expected: expected.to_string(),
            actual,
        }
    }

    /// Shorthand for a "multiple of `unit`" length violation.
    pub fn multiple_of(unit: usize, actual: usize) -> Self {
        Self::InvalidLength {
            expected: format!("a positive multiple of {unit}"),
            actual,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T, E = TernaryError> = std::result::Result<T, E>;

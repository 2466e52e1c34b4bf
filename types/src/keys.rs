//! Secret key material for one-time signatures.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, TernaryError};
use crate::hash::{HASH_TRITS, HASH_TRYTES};
use crate::security::{SecurityLevel, FRAGMENT_TRITS};
use crate::trit::{validate_trits, Trit};
use crate::trytes::trits_from_trytes_into;

/// An 81-tryte seed, the root of every key derived for one identity.
///
/// This type intentionally does not implement `Debug` or `Clone`.
/// Trits are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([Trit; HASH_TRITS]);

impl Seed {
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        if trytes.len() != HASH_TRYTES {
            return Err(TernaryError::length(HASH_TRYTES, trytes.len()));
        }
        let mut seed = Self([0; HASH_TRITS]);
        trits_from_trytes_into(trytes, &mut seed.0)?;
        Ok(seed)
    }

    pub fn from_trits(trits: &[Trit]) -> Result<Self> {
        if trits.len() != HASH_TRITS {
            return Err(TernaryError::length(HASH_TRITS, trits.len()));
        }
        validate_trits(trits)?;
        let mut seed = Self([0; HASH_TRITS]);
        seed.0.copy_from_slice(trits);
        Ok(seed)
    }

    pub fn as_trits(&self) -> &[Trit; HASH_TRITS] {
        &self.0
    }
}

/// Per-index derivation of a seed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Subseed([Trit; HASH_TRITS]);

impl Subseed {
    pub fn new(trits: [Trit; HASH_TRITS]) -> Self {
        Self(trits)
    }

    pub fn as_trits(&self) -> &[Trit; HASH_TRITS] {
        &self.0
    }
}

/// One-time private key: `security` fragments of 6561 trits.
///
/// Signing twice with the same key leaks enough of it to forge signatures;
/// tracking usage is the caller's job.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    trits: Vec<Trit>,
    #[zeroize(skip)]
    security: SecurityLevel,
}

impl PrivateKey {
    /// Wrap key trits; the length must match the security level.
    pub fn new(trits: Vec<Trit>, security: SecurityLevel) -> Result<Self> {
        if trits.len() != security.key_trits() {
            return Err(TernaryError::length(security.key_trits(), trits.len()));
        }
        validate_trits(&trits)?;
        Ok(Self { trits, security })
    }

    pub fn security(&self) -> SecurityLevel {
        self.security
    }

    pub fn as_trits(&self) -> &[Trit] {
        &self.trits
    }

    /// Key fragments of 6561 trits each.
    pub fn fragments(&self) -> std::slice::ChunksExact<'_, Trit> {
        self.trits.chunks_exact(FRAGMENT_TRITS)
    }
}

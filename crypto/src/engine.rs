//! End-to-end key, address and signature pipelines.

use serde::{Deserialize, Serialize};

use trinary_types::{
    trytes_from_trits, PrivateKey, Result, SecurityLevel, Seed, Subseed, Trit, TritHash,
};

use crate::normalize::normalize;
use crate::sponge::{AnySponge, SpongeKind};
use crate::{address, keys, sign};

/// Derives keys, addresses and signatures with a chosen sponge.
///
/// The engine holds no key material between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEngine {
    sponge: SpongeKind,
}

impl KeyEngine {
    pub fn new(sponge: SpongeKind) -> Self {
        Self { sponge }
    }

    pub fn sponge_kind(&self) -> SpongeKind {
        self.sponge
    }

    fn sponge(&self) -> AnySponge {
        self.sponge.sponge()
    }

    pub fn subseed(&self, seed: &Seed, index: u64) -> Result<Subseed> {
        keys::subseed(&mut self.sponge(), seed, index)
    }

    pub fn private_key(&self, subseed: &Subseed, security: SecurityLevel) -> Result<PrivateKey> {
        keys::private_key(&mut self.sponge(), subseed, security)
    }

    /// Private key for `(seed, index)`.
    pub fn key(&self, seed: &Seed, index: u64, security: SecurityLevel) -> Result<PrivateKey> {
        let mut sponge = self.sponge();
        let subseed = keys::subseed(&mut sponge, seed, index)?;
        keys::private_key(&mut sponge, &subseed, security)
    }

    pub fn address(&self, key: &PrivateKey) -> Result<TritHash> {
        address::address(&mut self.sponge(), key)
    }

    /// Seed -> subseed -> key -> address.
    pub fn generate_address(
        &self,
        seed: &Seed,
        index: u64,
        security: SecurityLevel,
    ) -> Result<TritHash> {
        let key = self.key(seed, index, security)?;
        self.address(&key)
    }

    pub fn generate_address_trytes(
        &self,
        seed: &str,
        index: u64,
        security: SecurityLevel,
    ) -> Result<String> {
        let seed = Seed::from_trytes(seed)?;
        Ok(self.generate_address(&seed, index, security)?.to_trytes())
    }

    pub fn generate_address_trits(
        &self,
        seed: &[Trit],
        index: u64,
        security: SecurityLevel,
    ) -> Result<Vec<Trit>> {
        let seed = Seed::from_trits(seed)?;
        Ok(self.generate_address(&seed, index, security)?.as_trits().to_vec())
    }

    /// Sign `bundle_hash` with the key at `(seed, index)`.
    pub fn generate_signature(
        &self,
        seed: &Seed,
        index: u64,
        security: SecurityLevel,
        bundle_hash: &TritHash,
    ) -> Result<Vec<Trit>> {
        let key = self.key(seed, index, security)?;
        sign::signature(&mut self.sponge(), &key, &normalize(bundle_hash))
    }

    pub fn generate_signature_trytes(
        &self,
        seed: &str,
        index: u64,
        security: SecurityLevel,
        bundle_hash: &str,
    ) -> Result<String> {
        let seed = Seed::from_trytes(seed)?;
        let bundle_hash = TritHash::from_trytes(bundle_hash)?;
        let signature = self.generate_signature(&seed, index, security, &bundle_hash)?;
        trytes_from_trits(&signature)
    }

    pub fn generate_signature_trits(
        &self,
        seed: &[Trit],
        index: u64,
        security: SecurityLevel,
        bundle_hash: &[Trit],
    ) -> Result<Vec<Trit>> {
        let seed = Seed::from_trits(seed)?;
        let bundle_hash = TritHash::from_trits(bundle_hash)?;
        self.generate_signature(&seed, index, security, &bundle_hash)
    }

    pub fn verify(
        &self,
        address: &TritHash,
        signature: &[Trit],
        bundle_hash: &TritHash,
    ) -> Result<bool> {
        sign::verify(&mut self.sponge(), address, signature, bundle_hash)
    }
}

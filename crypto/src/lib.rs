//! Ternary cryptographic primitives.
//!
//! - **Curl-P** (27 or 81 rounds) for transaction hashing and proof of work
//! - **Kerl** (Keccak-384 over trits) for bundle hashes and key derivation
//! - Hash-chain one-time signatures: seed -> subseed -> private key -> address,
//!   signatures over normalized bundle hashes, and their verification

mod bigint;

pub mod address;
pub mod curl;
pub mod engine;
pub mod hash;
pub mod kerl;
pub mod keys;
pub mod normalize;
pub mod sign;
pub mod sponge;

pub use address::{address, address_from_digests, digests};
pub use curl::{Curl, CurlRounds};
pub use engine::KeyEngine;
pub use hash::{bundle_hash, digest_trytes, transaction_hash};
pub use kerl::Kerl;
pub use keys::{generate_seed, private_key, subseed};
pub use normalize::{normalize, NormalizedBundle, MAX_DIGIT, MIN_DIGIT, NORMALIZED_DIGITS};
pub use sign::{digest_from_signature, signature, signature_fragment, verify};
pub use sponge::{AnySponge, Sponge, SpongeKind, RATE};

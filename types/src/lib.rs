//! Fundamental ternary types.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! trits and the tryte codec, fixed-width hashes, seeds and one-time keys,
//! security levels, the transaction layout and the common error type.

pub mod error;
pub mod hash;
pub mod keys;
pub mod security;
pub mod transaction;
pub mod trit;
pub mod trytes;

pub use error::{Result, TernaryError};
pub use hash::{TritHash, HASH_TRITS, HASH_TRYTES};
pub use keys::{PrivateKey, Seed, Subseed};
pub use security::{SecurityLevel, FRAGMENT_TRITS, SEGMENTS_PER_FRAGMENT};
pub use transaction::{
    layout, Nonce, Transaction, ESSENCE_TRITS, NONCE_TRITS, TRANSACTION_TRITS, TRANSACTION_TRYTES,
};
pub use trit::{
    add_assign_value, increment, is_trit, trits_from_value, validate_trits, value_from_trits, Trit,
    TRITS_PER_TRYTE,
};
pub use trytes::{
    trits_from_trytes, trits_from_trytes_exact, trits_from_trytes_into, tryte_from_value,
    tryte_value, trytes_from_trits, TRYTE_ALPHABET,
};

//! PoW validation.

use trinary_crypto::transaction_hash;
use trinary_types::{Trit, HASH_TRITS};

/// Number of trailing zero trits of the transaction's Curl-P-81 hash.
///
/// `None` for anything that is not a well-formed 8019-trit transaction.
pub fn pow_weight(transaction: &[Trit]) -> Option<usize> {
    transaction_hash(transaction)
        .ok()
        .map(|hash| hash.trailing_zeros())
}

/// Whether `transaction` carries a nonce worth at least `mwm` trailing zeros.
pub fn validate_pow(transaction: &[Trit], mwm: usize) -> bool {
    mwm <= HASH_TRITS && pow_weight(transaction).is_some_and(|weight| weight >= mwm)
}

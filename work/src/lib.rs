//! Curl-P proof of work.
//!
//! A transaction carries proof of work when the Curl-P-81 hash of its 8019
//! trits ends in at least `mwm` (minimum weight magnitude) zero trits. The
//! search only varies the 81-trit nonce at the end of the transaction.

pub mod bundle;
pub mod error;
pub mod generator;
mod sliced;
pub mod validator;

pub use bundle::AttachedTransaction;
pub use error::WorkError;
pub use generator::{PowOutcome, PowSearcher, MAX_MIN_WEIGHT_MAGNITUDE};
pub use validator::{pow_weight, validate_pow};

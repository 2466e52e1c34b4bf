//! Bundle security mining.
//!
//! A normalized digit of 13 means the matching key segment goes into the
//! signature unhashed. Reusing a key across bundles compounds this: what
//! matters is the per-position maximum over every bundle signed so far.
//! The miner tries small mutations of the bundle essence and keeps the one
//! whose hash exposes the least key material.

pub mod error;
pub mod mine;
pub mod score;

pub use error::MinerError;
pub use mine::{apply_index, mine, mine_with_cancel, spawn_mine, MiningOutcome, MiningRequest};
pub use score::{admissible, normalized_max, score, MiningScore};

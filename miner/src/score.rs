//! Scoring of candidate bundle hashes.

use serde::{Deserialize, Serialize};

use trinary_crypto::{normalize, NormalizedBundle, MAX_DIGIT, MIN_DIGIT};
use trinary_types::{SecurityLevel, TritHash, SEGMENTS_PER_FRAGMENT};

/// How much key material a candidate would expose. Lower is better;
/// `weak_digits` dominates and `exposure` breaks ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MiningScore {
    /// Signed positions whose combined digit is 13 (segment revealed as-is).
    pub weak_digits: u32,
    /// Sum over signed positions of `combined + 13`, i.e. hash steps given away.
    pub exposure: u32,
}

/// Digits that will be signed at `security`.
fn signed_positions(security: SecurityLevel) -> usize {
    security.fragments() * SEGMENTS_PER_FRAGMENT
}

/// Score `candidate` against the maximum already exposed per position.
pub fn score(
    max: &NormalizedBundle,
    candidate: &NormalizedBundle,
    security: SecurityLevel,
) -> MiningScore {
    let signed = signed_positions(security);
    let combined = max.max(candidate);
    combined.digits()[..signed]
        .iter()
        .fold(MiningScore { weak_digits: 0, exposure: 0 }, |acc, &digit| MiningScore {
            weak_digits: acc.weak_digits + u32::from(digit == MAX_DIGIT),
            exposure: acc.exposure + (digit - MIN_DIGIT) as u32,
        })
}

/// Under the fully-secure policy a 13 anywhere outside the signed positions
/// disqualifies the candidate.
pub fn admissible(candidate: &NormalizedBundle, security: SecurityLevel, fully_secure: bool) -> bool {
    !fully_secure
        || candidate.digits()[signed_positions(security)..]
            .iter()
            .all(|&digit| digit != MAX_DIGIT)
}

/// Running maximum over the normalized forms of already-signed bundle hashes.
pub fn normalized_max(signed_bundles: &[TritHash]) -> NormalizedBundle {
    signed_bundles
        .iter()
        .fold(NormalizedBundle::floor(), |max, hash| max.max(&normalize(hash)))
}

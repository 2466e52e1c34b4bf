//! Normalized bundle hashes.
//!
//! The 81 trytes of a bundle hash become 81 digits in `[-13, 13]`, split into
//! three fragments of 27. Each fragment is rebalanced to sum to zero, so a
//! signature never reveals more of the key in one fragment than it hides.

use std::fmt;

use trinary_types::{Result, TernaryError, TritHash, SEGMENTS_PER_FRAGMENT};

/// Digits in a normalized bundle hash.
pub const NORMALIZED_DIGITS: usize = 81;

/// Largest digit; a 13 leaves the key segment unhashed in the signature.
pub const MAX_DIGIT: i8 = 13;

/// Smallest digit.
pub const MIN_DIGIT: i8 = -13;

/// The digit form of a bundle hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NormalizedBundle([i8; NORMALIZED_DIGITS]);

impl NormalizedBundle {
    /// Wrap precomputed digits, rejecting any outside `[-13, 13]`.
    pub fn from_digits(digits: &[i8]) -> Result<Self> {
        let array: [i8; NORMALIZED_DIGITS] = digits
            .try_into()
            .map_err(|_| TernaryError::length(NORMALIZED_DIGITS, digits.len()))?;
        if let Some(&bad) = array.iter().find(|d| !(MIN_DIGIT..=MAX_DIGIT).contains(*d)) {
            return Err(TernaryError::InvalidParameter(format!(
                "normalized digit {bad} outside [-13, 13]"
            )));
        }
        Ok(Self(array))
    }

    /// Every digit at -13: the neutral element of [`max`](Self::max).
    pub const fn floor() -> Self {
        Self([MIN_DIGIT; NORMALIZED_DIGITS])
    }

    /// Position-wise maximum of two digit sequences.
    pub fn max(&self, other: &Self) -> Self {
        let mut digits = self.0;
        for (digit, &theirs) in digits.iter_mut().zip(&other.0) {
            *digit = (*digit).max(theirs);
        }
        Self(digits)
    }

    pub fn digits(&self) -> &[i8; NORMALIZED_DIGITS] {
        &self.0
    }

    /// The 27 digits that size signature fragment `index` (taken modulo 3).
    pub fn fragment(&self, index: usize) -> &[i8] {
        let start = (index % 3) * SEGMENTS_PER_FRAGMENT;
        &self.0[start..start + SEGMENTS_PER_FRAGMENT]
    }

    /// Number of digits equal to 13 among the first `digits` positions.
    pub fn count_max_digits(&self, digits: usize) -> usize {
        self.0[..digits.min(NORMALIZED_DIGITS)]
            .iter()
            .filter(|&&d| d == MAX_DIGIT)
            .count()
    }
}

impl fmt::Debug for NormalizedBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NormalizedBundle").field(&&self.0[..]).finish()
    }
}

/// Normalize a bundle hash.
pub fn normalize(hash: &TritHash) -> NormalizedBundle {
    let mut digits = [0i8; NORMALIZED_DIGITS];
    for (digit, triple) in digits.iter_mut().zip(hash.as_trits().chunks_exact(3)) {
        *digit = triple[0] + 3 * triple[1] + 9 * triple[2];
    }
    for fragment in digits.chunks_exact_mut(SEGMENTS_PER_FRAGMENT) {
        rebalance(fragment);
    }
    NormalizedBundle(digits)
}

/// Walk the fragment from the start, moving each digit toward the bound
/// opposite the sum until the fragment sums to zero.
fn rebalance(fragment: &mut [i8]) {
    let mut sum: i32 = fragment.iter().map(|&d| d as i32).sum();
    for digit in fragment.iter_mut() {
        if sum == 0 {
            break;
        }
        if sum > 0 {
            let step = (*digit as i32 - MIN_DIGIT as i32).min(sum);
            *digit -= step as i8;
            sum -= step;
        } else {
            let step = (MAX_DIGIT as i32 - *digit as i32).min(-sum);
            *digit += step as i8;
            sum += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trinary_types::HASH_TRITS;

    fn hash_of(value: i8) -> TritHash {
        let mut trits = [0i8; HASH_TRITS];
        for triple in trits.chunks_exact_mut(3) {
            let mut v = value;
            for t in triple.iter_mut() {
                let mut r = v % 3;
                v /= 3;
                if r > 1 {
                    r -= 3;
                    v += 1;
                } else if r < -1 {
                    r += 3;
                    v -= 1;
                }
                *t = r;
            }
        }
        TritHash::new(trits)
    }

    #[test]
    fn fragments_sum_to_zero() {
        for value in MIN_DIGIT..=MAX_DIGIT {
            let normalized = normalize(&hash_of(value));
            for i in 0..3 {
                let sum: i32 = normalized.fragment(i).iter().map(|&d| d as i32).sum();
                assert_eq!(sum, 0, "fragment {i} for value {value}");
            }
            assert!(normalized
                .digits()
                .iter()
                .all(|d| (MIN_DIGIT..=MAX_DIGIT).contains(d)));
        }
    }

    #[test]
    fn positive_sums_lower_leading_digits_first() {
        // 27 digits of 1 sum to 27: the first two digits absorb 14 and 13.
        let normalized = normalize(&hash_of(1));
        let fragment = normalized.fragment(0);
        assert_eq!(fragment[0], -13);
        assert_eq!(fragment[1], -12);
        assert!(fragment[2..].iter().all(|&d| d == 1));
    }

    #[test]
    fn negative_sums_raise_leading_digits_first() {
        let normalized = normalize(&hash_of(-13));
        let fragment = normalized.fragment(1);
        // sum = -351: thirteen digits go from -13 to 13 (26 each = 338), then one more by 13.
        assert!(fragment[..13].iter().all(|&d| d == 13));
        assert_eq!(fragment[13], 0);
        assert!(fragment[14..].iter().all(|&d| d == -13));
    }

    #[test]
    fn balanced_hash_is_unchanged() {
        let normalized = normalize(&TritHash::ZERO);
        assert!(normalized.digits().iter().all(|&d| d == 0));
        assert_eq!(normalized.count_max_digits(81), 0);
    }

    #[test]
    fn from_digits_validates() {
        assert!(NormalizedBundle::from_digits(&[0; 81]).is_ok());
        assert!(NormalizedBundle::from_digits(&[0; 80]).is_err());
        let mut digits = [0i8; 81];
        digits[3] = 14;
        assert!(NormalizedBundle::from_digits(&digits).is_err());
    }

    #[test]
    fn fragment_index_wraps() {
        let normalized = normalize(&hash_of(5));
        assert_eq!(normalized.fragment(0), normalized.fragment(3));
    }

    #[test]
    fn floor_is_neutral_for_max() {
        let normalized = normalize(&hash_of(5));
        assert_eq!(NormalizedBundle::floor().max(&normalized), normalized);
        let mut digits = [0i8; NORMALIZED_DIGITS];
        digits[4] = 13;
        let raised = normalized.max(&NormalizedBundle::from_digits(&digits).unwrap());
        assert_eq!(raised.digits()[4], 13);
        assert!(raised.digits().iter().all(|&d| d >= 0));
    }
}

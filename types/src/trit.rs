//! Balanced-ternary digits and in-place arithmetic on trit fields.

use crate::error::{Result, TernaryError};

/// A balanced-ternary digit, always one of `-1`, `0` or `1`.
pub type Trit = i8;

/// Number of trits in one tryte.
pub const TRITS_PER_TRYTE: usize = 3;

/// Largest trit field [`value_from_trits`] can decode without overflowing `i64`.
pub const MAX_VALUE_TRITS: usize = 40;

/// Returns `true` if `value` is a valid trit.
#[inline]
pub fn is_trit(value: i8) -> bool {
    (-1..=1).contains(&value)
}

/// Reject buffers containing anything other than `-1`, `0` or `1`.
pub fn validate_trits(trits: &[Trit]) -> Result<()> {
    match trits.iter().position(|&t| !is_trit(t)) {
        Some(position) => Err(TernaryError::InvalidTrit {
            value: trits[position],
            position,
        }),
        None => Ok(()),
    }
}

/// Split the least significant balanced trit off `value`.
#[inline]
fn split_low_trit(value: i64) -> (Trit, i64) {
    let mut rem = (value % 3) as i8;
    let mut rest = value / 3;
    if rem > 1 {
        rem -= 3;
        rest += 1;
    } else if rem < -1 {
        rem += 3;
        rest -= 1;
    }
    (rem, rest)
}

/// Write the balanced-ternary representation of `value` into `out`,
/// little-endian. Digits that do not fit are dropped.
pub fn trits_from_value(value: i64, out: &mut [Trit]) {
    let mut rest = value;
    for trit in out.iter_mut() {
        let (low, next) = split_low_trit(rest);
        *trit = low;
        rest = next;
    }
}

/// Decode a little-endian balanced-ternary field into an integer.
///
/// Fields longer than [`MAX_VALUE_TRITS`] are rejected.
pub fn value_from_trits(trits: &[Trit]) -> Result<i64> {
    if trits.len() > MAX_VALUE_TRITS {
        return Err(TernaryError::InvalidLength {
            expected: format!("at most {MAX_VALUE_TRITS}"),
            actual: trits.len(),
        });
    }
    Ok(trits.iter().rev().fold(0i64, |acc, &t| acc * 3 + t as i64))
}

/// Balanced-ternary increment: `-1 -> 0`, `0 -> 1`, `1 -> -1` with carry.
///
/// Returns `true` when the carry ran off the end of the field (the field
/// wrapped around to all `-1`).
pub fn increment(field: &mut [Trit]) -> bool {
    for trit in field.iter_mut() {
        if *trit == 1 {
            *trit = -1;
        } else {
            *trit += 1;
            return false;
        }
    }
    true
}

/// Add `value` into a little-endian trit field in place, propagating carries.
/// Overflow past the end of the field is discarded.
pub fn add_assign_value(field: &mut [Trit], value: i64) {
    let mut rest = value;
    let mut carry: i8 = 0;
    for trit in field.iter_mut() {
        if rest == 0 && carry == 0 {
            break;
        }
        let (digit, next) = split_low_trit(rest);
        rest = next;
        let (sum, next_carry) = match *trit + digit + carry {
            -3 => (0, -1),
            -2 => (1, -1),
            2 => (-1, 1),
            3 => (0, 1),
            s => (s, 0),
        };
        *trit = sum;
        carry = next_carry;
    }
}

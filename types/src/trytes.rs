//! Tryte <-> trit codec.
//!
//! Alphabet: `9ABCDEFGHIJKLMNOPQRSTUVWXYZ`. `9` is zero, `A`..`M` are 1..13 and
//! `N`..`Z` are -13..-1. Each tryte expands to three little-endian trits.

use crate::error::{Result, TernaryError};
use crate::trit::{trits_from_value, validate_trits, Trit, TRITS_PER_TRYTE};

/// The 27-symbol tryte alphabet, indexed by `value mod 27`.
pub const TRYTE_ALPHABET: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Reverse lookup: ASCII byte -> tryte value (`i8::MIN` = not in alphabet).
const TRYTE_DECODE: [i8; 128] = {
    let mut table = [i8::MIN; 128];
    let mut i = 0;
    while i < 27 {
        let value = if i <= 13 { i as i8 } else { i as i8 - 27 };
        table[TRYTE_ALPHABET[i] as usize] = value;
        i += 1;
    }
    table
};

/// Trit triples for every tryte value, offset by 13.
const TRYTE_TRITS: [[Trit; 3]; 27] = {
    let mut table = [[0i8; 3]; 27];
    let mut i = 0;
    while i < 27 {
        let value = i as i8 - 13;
        // value = t0 + 3*t1 + 9*t2 with t in {-1, 0, 1}
        let mut rest = value;
        let mut j = 0;
        while j < 3 {
            let mut rem = rest % 3;
            rest /= 3;
            if rem > 1 {
                rem -= 3;
                rest += 1;
            } else if rem < -1 {
                rem += 3;
                rest -= 1;
            }
            table[i][j] = rem;
            j += 1;
        }
        i += 1;
    }
    table
};

/// Numeric value of a tryte character in `[-13, 13]`.
#[inline]
pub fn tryte_value(ch: char) -> Option<i8> {
    if !ch.is_ascii() {
        return None;
    }
    match TRYTE_DECODE[ch as usize] {
        i8::MIN => None,
        value => Some(value),
    }
}

/// Character for a tryte value in `[-13, 13]`.
#[inline]
pub fn tryte_from_value(value: i8) -> Option<char> {
    if !(-13..=13).contains(&value) {
        return None;
    }
    let index = if value < 0 { value + 27 } else { value };
    Some(TRYTE_ALPHABET[index as usize] as char)
}

/// Value of three little-endian trits.
#[inline]
pub fn value_of_triple(triple: &[Trit]) -> i8 {
    triple[0] + 3 * triple[1] + 9 * triple[2]
}

/// Decode a tryte string into trits, writing into `out`.
///
/// `out` must be exactly three times the string length.
pub fn trits_from_trytes_into(trytes: &str, out: &mut [Trit]) -> Result<()> {
    let expected = trytes.len() * TRITS_PER_TRYTE;
    if out.len() != expected {
        return Err(TernaryError::length(expected, out.len()));
    }
    for ((position, ch), chunk) in trytes
        .chars()
        .enumerate()
        .zip(out.chunks_exact_mut(TRITS_PER_TRYTE))
    {
        let value = tryte_value(ch).ok_or(TernaryError::InvalidAlphabet { ch, position })?;
        chunk.copy_from_slice(&TRYTE_TRITS[(value + 13) as usize]);
    }
    Ok(())
}

/// Decode a tryte string into a trit vector.
pub fn trits_from_trytes(trytes: &str) -> Result<Vec<Trit>> {
    // Non-ASCII input would make `len()` disagree with the char count.
    if let Some((position, ch)) = trytes.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
        return Err(TernaryError::InvalidAlphabet { ch, position });
    }
    let mut trits = vec![0; trytes.len() * TRITS_PER_TRYTE];
    trits_from_trytes_into(trytes, &mut trits)?;
    Ok(trits)
}

/// Encode trits as a tryte string. The length must be a multiple of 3.
pub fn trytes_from_trits(trits: &[Trit]) -> Result<String> {
    if trits.len() % TRITS_PER_TRYTE != 0 {
        return Err(TernaryError::InvalidLength {
            expected: "a multiple of 3".into(),
            actual: trits.len(),
        });
    }
    validate_trits(trits)?;
    Ok(trits
        .chunks_exact(TRITS_PER_TRYTE)
        .map(|triple| TRYTE_ALPHABET[(value_of_triple(triple) + 27) as usize % 27] as char)
        .collect())
}

/// Decode a tryte string that must have exactly `len` trytes.
pub fn trits_from_trytes_exact(trytes: &str, len: usize) -> Result<Vec<Trit>> {
    if trytes.len() != len {
        return Err(TernaryError::length(len, trytes.len()));
    }
    trits_from_trytes(trytes)
}

/// Trits of a single tryte value in `[-13, 13]`.
pub fn tryte_trits(value: i8) -> Result<[Trit; 3]> {
    if !(-13..=13).contains(&value) {
        return Err(TernaryError::InvalidParameter(format!(
            "tryte value {value} outside [-13, 13]"
        )));
    }
    let mut triple = [0; 3];
    trits_from_value(value as i64, &mut triple);
    Ok(triple)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_values() {
        assert_eq!(tryte_value('9'), Some(0));
        assert_eq!(tryte_value('A'), Some(1));
        assert_eq!(tryte_value('M'), Some(13));
        assert_eq!(tryte_value('N'), Some(-13));
        assert_eq!(tryte_value('Z'), Some(-1));
        assert_eq!(tryte_value('a'), None);
        assert_eq!(tryte_value('é'), None);
    }

    #[test]
    fn single_tryte_trits() {
        assert_eq!(trits_from_trytes("9").unwrap(), vec![0, 0, 0]);
        assert_eq!(trits_from_trytes("A").unwrap(), vec![1, 0, 0]);
        assert_eq!(trits_from_trytes("M").unwrap(), vec![1, 1, 1]);
        assert_eq!(trits_from_trytes("N").unwrap(), vec![-1, -1, -1]);
        assert_eq!(trits_from_trytes("Z").unwrap(), vec![-1, 0, 0]);
    }

    #[test]
    fn table_agrees_with_generic_conversion() {
        for value in -13i8..=13 {
            assert_eq!(TRYTE_TRITS[(value + 13) as usize], tryte_trits(value).unwrap());
            let ch = tryte_from_value(value).unwrap();
            assert_eq!(tryte_value(ch), Some(value));
        }
    }

    #[test]
    fn invalid_character_reports_position() {
        assert_eq!(
            trits_from_trytes("AB#C"),
            Err(TernaryError::InvalidAlphabet {
                ch: '#',
                position: 2
            })
        );
        assert!(matches!(
            trits_from_trytes("Aü"),
            Err(TernaryError::InvalidAlphabet { ch: 'ü', position: 1 })
        ));
    }

    #[test]
    fn trit_length_must_be_multiple_of_three() {
        assert!(matches!(
            trytes_from_trits(&[0, 1]),
            Err(TernaryError::InvalidLength { actual: 2, .. })
        ));
    }

    #[test]
    fn encode_rejects_bad_trits() {
        assert!(matches!(
            trytes_from_trits(&[0, 5, 0]),
            Err(TernaryError::InvalidTrit { value: 5, position: 1 })
        ));
    }

    #[test]
    fn round_trip_alphabet() {
        let all = std::str::from_utf8(TRYTE_ALPHABET).unwrap();
        let trits = trits_from_trytes(all).unwrap();
        assert_eq!(trits.len(), 81);
        assert_eq!(trytes_from_trits(&trits).unwrap(), all);
    }

    #[test]
    fn exact_length_is_enforced() {
        assert!(trits_from_trytes_exact("ABC", 3).is_ok());
        assert!(matches!(
            trits_from_trytes_exact("ABC", 81),
            Err(TernaryError::InvalidLength { actual: 3, .. })
        ));
    }
}

//! 384-bit integers for converting between 243 trits and Keccak-384 bytes.
//!
//! A 243-trit chunk (last trit forced to zero) is a balanced-ternary integer in
//! `[-(3^242 - 1)/2, (3^242 - 1)/2]`, serialized as a 48-byte big-endian two's
//! complement number. Digests outside that range reduce modulo `3^242`.

use std::cmp::Ordering;

use trinary_types::Trit;

/// Bytes in a Keccak-384 digest.
pub const BYTE_LENGTH: usize = 48;

/// Trits that carry information in one Kerl chunk.
pub const TRIT_LENGTH: usize = 242;

const WORDS: usize = BYTE_LENGTH / 4;

/// Unsigned 384-bit integer, little-endian 32-bit words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct U384([u32; WORDS]);

impl U384 {
    const ZERO: Self = Self([0; WORDS]);

    const fn mul_small_add(mut self, factor: u32, addend: u32) -> Self {
        let mut carry = addend as u64;
        let mut i = 0;
        while i < WORDS {
            let product = self.0[i] as u64 * factor as u64 + carry;
            self.0[i] = product as u32;
            carry = product >> 32;
            i += 1;
        }
        self
    }

    const fn pow3(exponent: usize) -> Self {
        let mut value = Self::ZERO;
        value.0[0] = 1;
        let mut i = 0;
        while i < exponent {
            value = value.mul_small_add(3, 0);
            i += 1;
        }
        value
    }

    /// `(self - 1) / 2`, for odd `self`.
    const fn half_below(mut self) -> Self {
        // Odd, so subtracting one never borrows past word 0.
        self.0[0] -= 1;
        let mut i = 0;
        while i < WORDS {
            let high = if i + 1 < WORDS { self.0[i + 1] << 31 } else { 0 };
            self.0[i] = (self.0[i] >> 1) | high;
            i += 1;
        }
        self
    }

    fn wrapping_add(self, other: Self) -> Self {
        let mut out = Self::ZERO;
        let mut carry = 0u64;
        for i in 0..WORDS {
            let sum = self.0[i] as u64 + other.0[i] as u64 + carry;
            out.0[i] = sum as u32;
            carry = sum >> 32;
        }
        out
    }

    fn wrapping_sub(self, other: Self) -> Self {
        let mut out = Self::ZERO;
        let mut borrow = 0i64;
        for i in 0..WORDS {
            let mut diff = self.0[i] as i64 - other.0[i] as i64 - borrow;
            borrow = 0;
            if diff < 0 {
                diff += 1 << 32;
                borrow = 1;
            }
            out.0[i] = diff as u32;
        }
        out
    }

    fn negate(self) -> Self {
        let mut inverted = self;
        for word in inverted.0.iter_mut() {
            *word = !*word;
        }
        inverted.wrapping_add(Self::one())
    }

    fn one() -> Self {
        let mut one = Self::ZERO;
        one.0[0] = 1;
        one
    }

    fn is_negative(&self) -> bool {
        self.0[WORDS - 1] >> 31 == 1
    }

    /// Divide in place, returning the remainder.
    fn div_rem_small(&mut self, divisor: u32) -> u32 {
        let mut rem = 0u64;
        for word in self.0.iter_mut().rev() {
            let current = (rem << 32) | *word as u64;
            *word = (current / divisor as u64) as u32;
            rem = current % divisor as u64;
        }
        rem as u32
    }

    fn to_be_bytes(self) -> [u8; BYTE_LENGTH] {
        let mut bytes = [0; BYTE_LENGTH];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0.iter().rev()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    fn from_be_bytes(bytes: &[u8; BYTE_LENGTH]) -> Self {
        let mut value = Self::ZERO;
        for (word, chunk) in value.0.iter_mut().rev().zip(bytes.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        value
    }
}

impl PartialOrd for U384 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U384 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

const THREE_POW_242: U384 = U384::pow3(TRIT_LENGTH);
const HALF_THREE_POW_242: U384 = THREE_POW_242.half_below();

/// Encode a 243-trit chunk as 48 big-endian bytes. Trit 242 is ignored.
pub fn trits_to_bytes(trits: &[Trit]) -> [u8; BYTE_LENGTH] {
    debug_assert!(trits.len() > TRIT_LENGTH);
    let mut base = U384::ZERO;
    for &trit in trits[..TRIT_LENGTH].iter().rev() {
        base = base.mul_small_add(3, (trit + 1) as u32);
    }
    let value = if base >= HALF_THREE_POW_242 {
        base.wrapping_sub(HALF_THREE_POW_242)
    } else {
        HALF_THREE_POW_242.wrapping_sub(base).negate()
    };
    value.to_be_bytes()
}

/// Decode 48 big-endian bytes into 243 trits; trit 242 is always zero.
pub fn bytes_to_trits(bytes: &[u8; BYTE_LENGTH], out: &mut [Trit]) {
    debug_assert!(out.len() > TRIT_LENGTH);
    let value = U384::from_be_bytes(bytes);
    let mut base = if !value.is_negative() {
        value.wrapping_add(HALF_THREE_POW_242)
    } else {
        let magnitude = value.negate();
        if magnitude <= HALF_THREE_POW_242 {
            HALF_THREE_POW_242.wrapping_sub(magnitude)
        } else {
            THREE_POW_242
                .wrapping_sub(magnitude)
                .wrapping_add(HALF_THREE_POW_242)
        }
    };
    for trit in out[..TRIT_LENGTH].iter_mut() {
        *trit = base.div_rem_small(3) as i8 - 1;
    }
    out[TRIT_LENGTH] = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_pow_242_fits_in_384_bits() {
        // 3^242 > 2^383, so the top bit is in use.
        assert_eq!(THREE_POW_242.0[WORDS - 1] >> 31, 1);
        let mut reduced = THREE_POW_242;
        for _ in 0..TRIT_LENGTH {
            assert_eq!(reduced.div_rem_small(3), 0);
        }
        assert_eq!(reduced, U384::one());
    }

    #[test]
    fn half_is_floor_of_half() {
        let doubled = HALF_THREE_POW_242
            .wrapping_add(HALF_THREE_POW_242)
            .wrapping_add(U384::one());
        assert_eq!(doubled, THREE_POW_242);
    }

    #[test]
    fn zero_trits_encode_as_zero_bytes() {
        let trits = [0i8; 243];
        assert_eq!(trits_to_bytes(&trits), [0u8; BYTE_LENGTH]);
    }

    #[test]
    fn small_values_encode_as_twos_complement() {
        let mut trits = [0i8; 243];
        trits[0] = 1;
        let mut expected = [0u8; BYTE_LENGTH];
        expected[BYTE_LENGTH - 1] = 1;
        assert_eq!(trits_to_bytes(&trits), expected);

        trits[0] = -1;
        assert_eq!(trits_to_bytes(&trits), [0xFF; BYTE_LENGTH]);
    }

    #[test]
    fn last_trit_is_ignored() {
        let mut a = [1i8; 243];
        let mut b = [1i8; 243];
        a[242] = -1;
        b[242] = 0;
        assert_eq!(trits_to_bytes(&a), trits_to_bytes(&b));
    }

    #[test]
    fn round_trip_in_range() {
        let mut trits = [0i8; 243];
        for (i, t) in trits.iter_mut().enumerate().take(TRIT_LENGTH) {
            *t = ((i * 5 + 1) % 3) as i8 - 1;
        }
        let bytes = trits_to_bytes(&trits);
        let mut back = [9i8; 243];
        bytes_to_trits(&bytes, &mut back);
        assert_eq!(back, trits);
    }

    #[test]
    fn extreme_negative_digest_decodes_to_trits() {
        let mut bytes = [0u8; BYTE_LENGTH];
        bytes[0] = 0x80;
        let mut out = [0i8; 243];
        bytes_to_trits(&bytes, &mut out);
        assert!(out.iter().all(|t| (-1..=1).contains(t)));
        assert_eq!(out[242], 0);
    }
}

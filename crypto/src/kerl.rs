//! Kerl: Keccak-384 driven as a ternary sponge.
//!
//! Absorbing converts each 243-trit chunk to 48 bytes and feeds Keccak.
//! Squeezing finalizes, converts the digest back to trits and re-seeds Keccak
//! with the bitwise complement of that digest so the next chunk differs.

use sha3::{Digest, Keccak384};

use trinary_types::{validate_trits, Result, Trit};

use crate::bigint::{bytes_to_trits, trits_to_bytes, BYTE_LENGTH};
use crate::sponge::{check_rate, Sponge, RATE};

#[derive(Clone, Default)]
pub struct Kerl {
    keccak: Keccak384,
}

impl Kerl {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sponge for Kerl {
    fn absorb(&mut self, trits: &[Trit]) -> Result<()> {
        check_rate(trits.len())?;
        validate_trits(trits)?;
        for chunk in trits.chunks_exact(RATE) {
            self.keccak.update(trits_to_bytes(chunk));
        }
        Ok(())
    }

    fn squeeze(&mut self, out: &mut [Trit]) -> Result<()> {
        check_rate(out.len())?;
        for chunk in out.chunks_exact_mut(RATE) {
            let digest = self.keccak.finalize_reset();
            let mut bytes = [0u8; BYTE_LENGTH];
            bytes.copy_from_slice(&digest);
            bytes_to_trits(&bytes, chunk);
            for byte in bytes.iter_mut() {
                *byte = !*byte;
            }
            self.keccak.update(bytes);
        }
        Ok(())
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.keccak);
    }
}

//! Curl-P: the 729-trit ternary sponge.
//!
//! Each round replaces every state trit with a substitution of two scratchpad
//! trits picked by a fixed walk over the state (`p -> p + 364` below 365,
//! `p -> p - 365` otherwise).

use trinary_types::{validate_trits, Result, Trit};

use crate::sponge::{check_rate, Sponge, RATE};

/// Trits in the Curl-P state.
pub const STATE_TRITS: usize = 3 * RATE;

/// Substitution indexed by `a + 4 * b + 5`. Entries 3 and 7 are unreachable.
pub const TRUTH_TABLE: [Trit; 11] = [1, 0, -1, 2, 1, -1, 0, 2, -1, 1, 0];

/// Number of permutation rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurlRounds {
    P27 = 27,
    P81 = 81,
}

impl CurlRounds {
    pub fn count(self) -> usize {
        self as usize
    }
}

/// Next position of the scratchpad walk.
#[inline(always)]
pub fn next_index(index: usize) -> usize {
    if index < 365 {
        index + 364
    } else {
        index - 365
    }
}

/// Apply `rounds` rounds of the Curl-P permutation to `state`.
pub fn transform(state: &mut [Trit; STATE_TRITS], rounds: usize) {
    let mut scratch = [0 as Trit; STATE_TRITS];
    for _ in 0..rounds {
        scratch.copy_from_slice(state);
        let mut index = 0;
        for slot in state.iter_mut() {
            let a = scratch[index];
            index = next_index(index);
            let b = scratch[index];
            *slot = TRUTH_TABLE[(a + (b << 2) + 5) as usize];
        }
    }
}

#[derive(Clone)]
pub struct Curl {
    state: [Trit; STATE_TRITS],
    rounds: CurlRounds,
}

impl Curl {
    pub fn new(rounds: CurlRounds) -> Self {
        Self {
            state: [0; STATE_TRITS],
            rounds,
        }
    }

    pub fn rounds(&self) -> CurlRounds {
        self.rounds
    }

    /// The full 729-trit state, e.g. a mid-state after absorbing a prefix.
    pub fn state(&self) -> &[Trit; STATE_TRITS] {
        &self.state
    }

    fn permute(&mut self) {
        transform(&mut self.state, self.rounds.count());
    }
}

impl Default for Curl {
    fn default() -> Self {
        Self::new(CurlRounds::P81)
    }
}

impl Sponge for Curl {
    fn absorb(&mut self, trits: &[Trit]) -> Result<()> {
        check_rate(trits.len())?;
        validate_trits(trits)?;
        for chunk in trits.chunks_exact(RATE) {
            self.state[..RATE].copy_from_slice(chunk);
            self.permute();
        }
        Ok(())
    }

    fn squeeze(&mut self, out: &mut [Trit]) -> Result<()> {
        check_rate(out.len())?;
        for chunk in out.chunks_exact_mut(RATE) {
            chunk.copy_from_slice(&self.state[..RATE]);
            self.permute();
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state = [0; STATE_TRITS];
    }
}

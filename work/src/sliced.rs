//! Curl-P over 64 candidates at once.
//!
//! Every trit is stored as a `(low, high)` bit pair and each bit position of
//! the `u64` words is an independent lane:
//!
//! | trit | low | high |
//! |------|-----|------|
//! | 1    | 0   | 1    |
//! | -1   | 1   | 0    |
//! | 0    | 1   | 1    |

use trinary_crypto::curl::{next_index, STATE_TRITS};
use trinary_types::Trit;

pub const LANES: usize = 64;

const ALL: u64 = u64::MAX;

#[inline]
fn encode(trit: Trit) -> (u64, u64) {
    match trit {
        1 => (0, ALL),
        -1 => (ALL, 0),
        _ => (ALL, ALL),
    }
}

#[derive(Clone)]
pub struct SlicedCurl {
    low: [u64; STATE_TRITS],
    high: [u64; STATE_TRITS],
}

impl SlicedCurl {
    /// Every lane holds `state`.
    pub fn broadcast(state: &[Trit; STATE_TRITS]) -> Self {
        let mut low = [0; STATE_TRITS];
        let mut high = [0; STATE_TRITS];
        for (i, &trit) in state.iter().enumerate() {
            (low[i], high[i]) = encode(trit);
        }
        Self { low, high }
    }

    /// Set position `index` to `trit` in every lane.
    #[inline]
    pub fn set(&mut self, index: usize, trit: Trit) {
        (self.low[index], self.high[index]) = encode(trit);
    }

    /// Set position `index` to `trit` in a single lane.
    pub fn set_lane(&mut self, index: usize, lane: usize, trit: Trit) {
        let bit = 1u64 << lane;
        let (low, high) = encode(trit);
        self.low[index] = (self.low[index] & !bit) | (low & bit);
        self.high[index] = (self.high[index] & !bit) | (high & bit);
    }

    #[cfg(test)]
    pub fn lane(&self, index: usize, lane: usize) -> Trit {
        let low = (self.low[index] >> lane) & 1;
        let high = (self.high[index] >> lane) & 1;
        match (low, high) {
            (0, 1) => 1,
            (1, 0) => -1,
            _ => 0,
        }
    }

    /// Lanes whose trits in `range` are all zero.
    pub fn zero_lanes(&self, range: std::ops::Range<usize>) -> u64 {
        range.fold(ALL, |mask, i| mask & self.low[i] & self.high[i])
    }

    pub fn transform(&mut self, rounds: usize) {
        let mut low = [0u64; STATE_TRITS];
        let mut high = [0u64; STATE_TRITS];
        for _ in 0..rounds {
            low.copy_from_slice(&self.low);
            high.copy_from_slice(&self.high);
            let mut index = 0;
            for i in 0..STATE_TRITS {
                let alpha = low[index];
                let beta = high[index];
                index = next_index(index);
                let gamma = high[index];
                let delta = (alpha | !gamma) & (low[index] ^ beta);
                self.low[i] = !delta;
                self.high[i] = (alpha ^ gamma) | delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trinary_crypto::curl::transform;

    fn pattern(seed: usize) -> [Trit; STATE_TRITS] {
        let mut state = [0; STATE_TRITS];
        for (i, t) in state.iter_mut().enumerate() {
            *t = ((i * 7 + seed * 11) % 3) as Trit - 1;
        }
        state
    }

    #[test]
    fn broadcast_round_trips() {
        let state = pattern(1);
        let sliced = SlicedCurl::broadcast(&state);
        for lane in [0, 17, 63] {
            for i in 0..STATE_TRITS {
                assert_eq!(sliced.lane(i, lane), state[i]);
            }
        }
    }

    #[test]
    fn matches_scalar_transform_in_every_lane() {
        let base = pattern(2);
        let mut sliced = SlicedCurl::broadcast(&base);
        let mut lanes = Vec::new();
        for lane in 0..LANES {
            let mut state = base;
            state[lane] = (lane % 3) as Trit - 1;
            state[700 - lane] = -state[lane];
            sliced.set_lane(lane, lane, state[lane]);
            sliced.set_lane(700 - lane, lane, state[700 - lane]);
            lanes.push(state);
        }

        sliced.transform(27);
        for (lane, state) in lanes.iter_mut().enumerate() {
            transform(state, 27);
            for i in 0..STATE_TRITS {
                assert_eq!(sliced.lane(i, lane), state[i], "lane {lane} trit {i}");
            }
        }
    }

    #[test]
    fn zero_lanes_tracks_individual_lanes() {
        let mut sliced = SlicedCurl::broadcast(&[0; STATE_TRITS]);
        assert_eq!(sliced.zero_lanes(0..243), u64::MAX);
        sliced.set_lane(10, 3, 1);
        assert_eq!(sliced.zero_lanes(0..243), !(1u64 << 3));
        assert_eq!(sliced.zero_lanes(11..243), u64::MAX);
    }
}

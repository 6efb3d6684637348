//! Bit-sliced Curl-P: 64 candidate states evaluated in parallel.
//!
//! Each trit position holds two `u64` planes. Bit `k` of the pair is the
//! trit of lane `k`: `(1, 0)` is -1, `(1, 1)` is 0, `(0, 1)` is 1.

use std::ops::Range;

use crate::sponge::curl::STATE_LENGTH;
use crate::ternary::Trit;

pub const LANES: usize = 64;
/// Nonce trits that select the lane; `3^4 >= 64`.
pub const LANE_TRITS: usize = 4;

const HIGH: u64 = u64::MAX;
const LOW: u64 = 0;

fn planes(trit: Trit) -> (u64, u64) {
    match trit {
        1 => (LOW, HIGH),
        -1 => (HIGH, LOW),
        _ => (HIGH, HIGH),
    }
}

/// The trits written into the lane-selecting nonce positions for `lane`.
pub fn lane_trits(lane: usize) -> [Trit; LANE_TRITS] {
    let mut trits = [0; LANE_TRITS];
    let mut rest = lane;
    for trit in trits.iter_mut() {
        *trit = (rest % 3) as Trit - 1;
        rest /= 3;
    }
    trits
}

#[derive(Clone)]
pub struct BctState {
    low: [u64; STATE_LENGTH],
    high: [u64; STATE_LENGTH],
}

impl BctState {
    /// Broadcasts a scalar Curl state to every lane.
    pub fn from_trits(trits: &[Trit; STATE_LENGTH]) -> Self {
        let mut state = Self {
            low: [HIGH; STATE_LENGTH],
            high: [HIGH; STATE_LENGTH],
        };
        for (index, &trit) in trits.iter().enumerate() {
            state.set(index, trit);
        }
        state
    }

    pub fn set(&mut self, index: usize, trit: Trit) {
        let (low, high) = planes(trit);
        self.low[index] = low;
        self.high[index] = high;
    }

    /// Writes a different trit per lane so that lanes cover distinct nonces.
    pub fn set_lane_selectors(&mut self, offset: usize) {
        for position in 0..LANE_TRITS {
            let (mut low, mut high) = (0u64, 0u64);
            for lane in 0..LANES {
                let (l, h) = planes(lane_trits(lane)[position]);
                low |= l & (1 << lane);
                high |= h & (1 << lane);
            }
            self.low[offset + position] = low;
            self.high[offset + position] = high;
        }
    }

    pub fn transform(&mut self, rounds: usize) {
        let mut scratch_low = [0u64; STATE_LENGTH];
        let mut scratch_high = [0u64; STATE_LENGTH];
        for _ in 0..rounds {
            scratch_low.copy_from_slice(&self.low);
            scratch_high.copy_from_slice(&self.high);
            let mut index = 0;
            for i in 0..STATE_LENGTH {
                let alpha = scratch_low[index];
                let beta = scratch_high[index];
                if index < 365 {
                    index += 364;
                } else {
                    index -= 365;
                }
                let gamma = scratch_high[index];
                let delta = (alpha | !gamma) & (scratch_low[index] ^ beta);
                self.low[i] = !delta;
                self.high[i] = (alpha ^ gamma) | delta;
            }
        }
    }

    /// Lanes whose trits in `range` are all zero.
    pub fn zero_lanes(&self, range: Range<usize>) -> u64 {
        range.fold(u64::MAX, |mask, i| mask & !(self.low[i] ^ self.high[i]))
    }

    /// Trit held by `lane` at `index`.
    pub fn trit(&self, index: usize, lane: usize) -> Trit {
        let low = (self.low[index] >> lane) & 1;
        let high = (self.high[index] >> lane) & 1;
        match (low, high) {
            (0, 1) => 1,
            (1, 0) => -1,
            _ => 0,
        }
    }
}

use super::Sponge;
use crate::ternary::{Trit, HASH_LENGTH};

pub const STATE_LENGTH: usize = HASH_LENGTH * 3;

/// Output for `a + 4 * b + 5` where `a` and `b` are the two state trits read
/// for each output position. Indices 3 and 7 never occur.
const TRUTH_TABLE: [Trit; 11] = [1, 0, -1, 2, 1, -1, 0, 2, -1, 1, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurlRounds {
    P27 = 27,
    P81 = 81,
}

/// Curl-P over a 729-trit state.
#[derive(Clone)]
pub struct Curl {
    rounds: CurlRounds,
    state: [Trit; STATE_LENGTH],
}

impl Curl {
    pub fn new(rounds: CurlRounds) -> Self {
        Self {
            rounds,
            state: [0; STATE_LENGTH],
        }
    }

    pub fn state(&self) -> &[Trit; STATE_LENGTH] {
        &self.state
    }

    fn transform(&mut self) {
        let mut scratch = [0; STATE_LENGTH];
        for _ in 0..self.rounds as usize {
            scratch.copy_from_slice(&self.state);
            let mut index = 0;
            for trit in self.state.iter_mut() {
                let prev = index;
                if index < 365 {
                    index += 364;
                } else {
                    index -= 365;
                }
                *trit = TRUTH_TABLE[(scratch[prev] + (scratch[index] << 2) + 5) as usize];
            }
        }
    }
}

impl Sponge for Curl {
    fn absorb(&mut self, trits: &[Trit]) {
        for chunk in trits.chunks(HASH_LENGTH) {
            self.state[..chunk.len()].copy_from_slice(chunk);
            self.transform();
        }
    }

    fn squeeze(&mut self, out: &mut [Trit]) {
        for chunk in out.chunks_mut(HASH_LENGTH) {
            let len = chunk.len();
            chunk.copy_from_slice(&self.state[..len]);
            self.transform();
        }
    }

    fn reset(&mut self) {
        self.state = [0; STATE_LENGTH];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_input_is_not_a_fixed_point() {
        // a = b = 0 maps to index 5, which is -1, so zeros do not survive
        let mut curl = Curl::new(CurlRounds::P81);
        let mut out = [0; HASH_LENGTH];
        curl.hash_into(&[0; HASH_LENGTH], &mut out);
        assert!(out.iter().any(|&t| t != 0));
    }

    #[test]
    fn test_deterministic_and_reset() {
        let input: Vec<Trit> = (0..HASH_LENGTH * 2).map(|i| (i % 3) as Trit - 1).collect();
        let mut curl = Curl::new(CurlRounds::P81);
        let mut first = [0; HASH_LENGTH];
        curl.hash_into(&input, &mut first);
        let mut second = [0; HASH_LENGTH];
        curl.hash_into(&input, &mut second);
        assert_eq!(first, second);
        assert!(first.iter().all(|t| (-1..=1).contains(t)));
    }

    #[test]
    fn test_rounds_change_output() {
        let input = [1; HASH_LENGTH];
        let mut p27 = [0; HASH_LENGTH];
        let mut p81 = [0; HASH_LENGTH];
        Curl::new(CurlRounds::P27).hash_into(&input, &mut p27);
        Curl::new(CurlRounds::P81).hash_into(&input, &mut p81);
        assert_ne!(p27, p81);
    }

    #[test]
    fn test_multi_block_squeeze_matches_sequential() {
        let input = [-1; HASH_LENGTH];
        let mut curl = Curl::new(CurlRounds::P27);
        curl.absorb(&input);
        let mut both = [0; HASH_LENGTH * 2];
        curl.squeeze(&mut both);

        let mut curl = Curl::new(CurlRounds::P27);
        curl.absorb(&input);
        let mut first = [0; HASH_LENGTH];
        let mut second = [0; HASH_LENGTH];
        curl.squeeze(&mut first);
        curl.squeeze(&mut second);
        assert_eq!(&both[..HASH_LENGTH], &first);
        assert_eq!(&both[HASH_LENGTH..], &second);
    }
}

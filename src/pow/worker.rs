use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::bct::{lane_trits, BctState, LANES, LANE_TRITS};
use super::CancelToken;
use crate::sponge::curl::STATE_LENGTH;
use crate::sponge::{Curl, CurlRounds, Sponge};
use crate::ternary::{u64_to_trits, Trit, HASH_LENGTH};
use crate::transaction::{TransactionTrytes, NONCE_OFFSET, NONCE_TRITS, TRANSACTION_TRITS};

/// Start of the final absorbed block.
const LAST_BLOCK: usize = TRANSACTION_TRITS - HASH_LENGTH;
/// Nonce start inside the final block.
const NONCE_IN_BLOCK: usize = NONCE_OFFSET - LAST_BLOCK;
const COUNTER_IN_BLOCK: usize = NONCE_IN_BLOCK + LANE_TRITS;
pub const COUNTER_TRITS: usize = NONCE_TRITS - LANE_TRITS;

const CURL_ROUNDS: usize = CurlRounds::P81 as usize;

/// Curl state after absorbing everything up to the final block, with the
/// fixed part of that block and the lane selectors already written.
pub struct MidState {
    state: BctState,
}

impl MidState {
    pub fn new(tx: &TransactionTrytes) -> Self {
        let trits = tx.as_trits();
        let mut curl = Curl::new(CurlRounds::P81);
        curl.absorb(&trits[..LAST_BLOCK]);

        let mut scalar: [Trit; STATE_LENGTH] = *curl.state();
        scalar[..NONCE_IN_BLOCK].copy_from_slice(&trits[LAST_BLOCK..NONCE_OFFSET]);

        let mut state = BctState::from_trits(&scalar);
        state.set_lane_selectors(NONCE_IN_BLOCK);
        Self { state }
    }
}

/// Nonce trits for a counter value and lane, as laid out by the search.
pub fn nonce_trits(counter: u64, lane: usize) -> [Trit; NONCE_TRITS] {
    let mut nonce = [0; NONCE_TRITS];
    nonce[..LANE_TRITS].copy_from_slice(&lane_trits(lane));
    let digits = u64_to_trits(counter);
    nonce[LANE_TRITS..LANE_TRITS + digits.len()].copy_from_slice(&digits);
    nonce
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    pub worker: usize,
    pub counter: u64,
    pub lane: usize,
}

pub struct PowWorker {
    pub id: usize,
    pub counter_start: u64,
    pub counter_end: u64,
    pub cancel_check_interval: u64,
    pub hash_counter: Arc<AtomicU64>,
    pub should_stop: Arc<AtomicBool>,
    pub cancel: CancelToken,
}

impl PowWorker {
    fn stopped(&self) -> bool {
        self.should_stop.load(Ordering::Relaxed) || self.cancel.is_cancelled()
    }

    /// Walks `counter_start..counter_end`, 64 nonces per step.
    ///
    /// Returns `None` once the range is exhausted or a stop is observed.
    /// An `mwm` above the hash length is treated as the hash length.
    pub(crate) fn search(&self, mid: &MidState, mwm: usize) -> Option<Found> {
        let mwm = mwm.min(HASH_LENGTH);
        let start_time = Instant::now();
        let interval = self.cancel_check_interval.max(1);
        let mut unreported = 0u64;
        let mut iterations = 0u64;
        let mut counter = self.counter_start;

        info!(
            "Worker {} starting search. Range: {} to {}, MWM: {}",
            self.id, self.counter_start, self.counter_end, mwm
        );

        while counter < self.counter_end {
            if iterations % interval == 0 {
                self.hash_counter.fetch_add(unreported, Ordering::Relaxed);
                unreported = 0;
                if self.stopped() {
                    debug!("Worker {} stopping after {} batches", self.id, iterations);
                    return None;
                }
            }

            let mut state = mid.state.clone();
            let digits = u64_to_trits(counter);
            for position in 0..COUNTER_TRITS {
                state.set(COUNTER_IN_BLOCK + position, digits.get(position).copied().unwrap_or(0));
            }
            state.transform(CURL_ROUNDS);

            iterations += 1;
            unreported += LANES as u64;

            let lanes = state.zero_lanes(HASH_LENGTH - mwm..HASH_LENGTH);
            if lanes != 0 {
                self.hash_counter.fetch_add(unreported, Ordering::Relaxed);
                let lane = lanes.trailing_zeros() as usize;
                info!(
                    "Worker {} found nonce! Counter: {}, Lane: {}, Time: {:?}",
                    self.id,
                    counter,
                    lane,
                    start_time.elapsed()
                );
                self.should_stop.store(true, Ordering::Relaxed);
                return Some(Found {
                    worker: self.id,
                    counter,
                    lane,
                });
            }

            counter += 1;
        }

        self.hash_counter.fetch_add(unreported, Ordering::Relaxed);
        debug!("Worker {} exhausted its range", self.id);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ternary::trailing_zeros;
    use crate::transaction::tests::sample_trytes;

    fn worker(start: u64, end: u64) -> PowWorker {
        PowWorker {
            id: 0,
            counter_start: start,
            counter_end: end,
            cancel_check_interval: 4,
            hash_counter: Arc::new(AtomicU64::new(0)),
            should_stop: Arc::new(AtomicBool::new(false)),
            cancel: CancelToken::new(),
        }
    }

    #[test]
    fn test_layout() {
        assert_eq!(LAST_BLOCK, 7776);
        assert_eq!(NONCE_IN_BLOCK, 162);
        assert_eq!(COUNTER_TRITS, 77);
    }

    #[test]
    fn test_nonce_trits_layout() {
        let nonce = nonce_trits(5, 3);
        assert_eq!(&nonce[..LANE_TRITS], &lane_trits(3));
        assert_eq!(&nonce[LANE_TRITS..LANE_TRITS + 2], &[-1, -1]);
        assert!(nonce[LANE_TRITS + 3..].iter().all(|&t| t == 0));
    }

    #[test]
    fn test_found_nonce_meets_mwm() {
        let tx = TransactionTrytes::from_trytes(&sample_trytes()).unwrap();
        let mid = MidState::new(&tx);
        let found = worker(0, 10_000).search(&mid, 3).unwrap();

        let solved = tx.with_nonce(&nonce_trits(found.counter, found.lane));
        assert!(trailing_zeros(&solved.hash()) >= 3);
    }

    #[test]
    fn test_zero_mwm_takes_first_candidate() {
        let tx = TransactionTrytes::from_trytes(&sample_trytes()).unwrap();
        let mid = MidState::new(&tx);
        let w = worker(42, 100);
        let found = w.search(&mid, 0).unwrap();
        assert_eq!(found.counter, 42);
        assert_eq!(found.lane, 0);
        assert_eq!(w.hash_counter.load(Ordering::Relaxed), LANES as u64);
    }

    #[test]
    fn test_stops_when_signalled() {
        let tx = TransactionTrytes::from_trytes(&sample_trytes()).unwrap();
        let mid = MidState::new(&tx);
        let w = worker(0, u64::MAX);
        w.cancel.cancel();
        assert_eq!(w.search(&mid, 200), None);
        assert_eq!(w.hash_counter.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_cancel_latency_is_bounded() {
        let tx = TransactionTrytes::from_trytes(&sample_trytes()).unwrap();
        let mid = MidState::new(&tx);
        let w = worker(0, u64::MAX);
        let cancel = w.cancel.clone();
        let hash_counter = Arc::clone(&w.hash_counter);

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            cancel.cancel();
            hash_counter.load(Ordering::Relaxed)
        });

        assert_eq!(w.search(&mid, HASH_LENGTH), None);
        let at_cancel = canceller.join().unwrap();
        let total = w.hash_counter.load(Ordering::Relaxed);

        // one worker flushes at most one more interval after seeing the request
        assert!(total >= at_cancel);
        assert!(
            total - at_cancel <= w.cancel_check_interval * LANES as u64,
            "{} nonces tried after cancellation",
            total - at_cancel
        );
    }

    #[test]
    fn test_oversized_mwm_is_clamped() {
        let tx = TransactionTrytes::from_trytes(&sample_trytes()).unwrap();
        let mid = MidState::new(&tx);
        let w = worker(0, 2);
        assert_eq!(w.search(&mid, 1_000), None);
        assert_eq!(w.hash_counter.load(Ordering::Relaxed), 2 * LANES as u64);
    }

    #[test]
    fn test_exhausts_range() {
        let tx = TransactionTrytes::from_trytes(&sample_trytes()).unwrap();
        let mid = MidState::new(&tx);
        let w = worker(0, 3);
        assert_eq!(w.search(&mid, 200), None);
        assert_eq!(w.hash_counter.load(Ordering::Relaxed), 3 * LANES as u64);
    }
}

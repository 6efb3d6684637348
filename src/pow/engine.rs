use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::solution::Solution;
use super::worker::{nonce_trits, Found, MidState, PowWorker};
use super::CancelToken;
use crate::config::PowConfig;
use crate::error::{Error, Result};
use crate::ternary::{trailing_zeros, trits_to_trytes, HASH_LENGTH};
use crate::transaction::TransactionTrytes;

/// Multi-threaded nonce search over a partitioned counter space.
pub struct PowEngine {
    config: PowConfig,
    hash_counter: Arc<AtomicU64>,
}

impl PowEngine {
    pub fn new(config: PowConfig) -> Self {
        Self {
            config,
            hash_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_threads(threads: usize) -> Self {
        Self::new(PowConfig {
            threads,
            ..PowConfig::default()
        })
    }

    pub fn config(&self) -> &PowConfig {
        &self.config
    }

    /// Nonces tried by the most recent search, updated while it runs.
    pub fn hash_count(&self) -> u64 {
        self.hash_counter.load(Ordering::Relaxed)
    }

    /// Finds a nonce giving `tx` a hash with at least `mwm` trailing zero
    /// trits and writes it into the nonce field.
    ///
    /// `tx` is left untouched unless a solution is found.
    pub fn search(&self, tx: &mut TransactionTrytes, mwm: usize, cancel: &CancelToken) -> Result<Solution> {
        if mwm > HASH_LENGTH {
            return Err(Error::InvalidMinWeightMagnitude(mwm));
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let counter_start = self.config.counter_start;
        let counter_end = self.config.counter_end();
        if counter_start >= counter_end {
            return Err(Error::SearchExhausted);
        }

        let span = counter_end - counter_start;
        let threads = (self.config.threads.max(1) as u64).min(span) as usize;
        let per_worker = span / threads as u64;

        info!("Starting PoW search with {} threads, MWM: {}", threads, mwm);

        self.hash_counter.store(0, Ordering::Relaxed);
        let should_stop = Arc::new(AtomicBool::new(false));
        let start_time = Instant::now();
        let mid = MidState::new(tx);

        let found = thread::scope(|scope| {
            let (solution_tx, solution_rx) = mpsc::channel::<Found>();
            let mid = &mid;

            for i in 0..threads {
                let worker_start = counter_start + i as u64 * per_worker;
                let worker_end = if i == threads - 1 {
                    counter_end
                } else {
                    worker_start + per_worker
                };

                let worker = PowWorker {
                    id: i,
                    counter_start: worker_start,
                    counter_end: worker_end,
                    cancel_check_interval: self.config.cancel_check_interval,
                    hash_counter: Arc::clone(&self.hash_counter),
                    should_stop: Arc::clone(&should_stop),
                    cancel: cancel.clone(),
                };
                let solution_tx = solution_tx.clone();

                scope.spawn(move || {
                    if let Some(found) = worker.search(mid, mwm) {
                        // the receiver only keeps the first solution
                        let _ = solution_tx.send(found);
                    }
                });
            }
            drop(solution_tx);

            let first = solution_rx.recv().ok();
            should_stop.store(true, Ordering::Relaxed);
            first
        });

        let hash_attempts = self.hash_count();
        let time_taken_ms = start_time.elapsed().as_millis() as u64;

        let Some(found) = found else {
            if cancel.is_cancelled() {
                info!("PoW search cancelled after {} attempts", hash_attempts);
                return Err(Error::Cancelled);
            }
            warn!("PoW search exhausted {} counters without a solution", span);
            return Err(Error::SearchExhausted);
        };

        tx.set_nonce(&nonce_trits(found.counter, found.lane));
        let hash = tx.hash();
        let weight_magnitude = trailing_zeros(&hash);
        debug!(
            "Worker {} solution has weight magnitude {} (requested {})",
            found.worker, weight_magnitude, mwm
        );

        let solution = Solution {
            nonce: tx.nonce(),
            hash: trits_to_trytes(&hash)?,
            weight_magnitude,
            worker: found.worker,
            hash_attempts,
            time_taken_ms,
        };
        info!(
            "PoW solved in {}ms, {} attempts ({:.0} H/s)",
            solution.time_taken_ms,
            solution.hash_attempts,
            solution.hashrate()
        );
        Ok(solution)
    }
}

impl Default for PowEngine {
    fn default() -> Self {
        Self::new(PowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::verify;
    use crate::transaction::tests::sample_trytes;
    use crate::transaction::NONCE_OFFSET;
    use std::time::Duration;

    fn sample() -> TransactionTrytes {
        TransactionTrytes::from_trytes(&sample_trytes()).unwrap()
    }

    fn engine(threads: usize, counter_end: Option<u64>) -> PowEngine {
        PowEngine::new(PowConfig {
            threads,
            cancel_check_interval: 1,
            counter_start: 0,
            counter_end,
        })
    }

    fn solve(threads: usize, mwm: usize) {
        let original = sample();
        let mut tx = original.clone();
        let solution = engine(threads, None).search(&mut tx, mwm, &CancelToken::new()).unwrap();

        assert!(verify(&tx, mwm));
        assert!(solution.weight_magnitude >= mwm);
        assert_eq!(solution.nonce, tx.nonce());
        assert_eq!(solution.hash, tx.hash_trytes());
        assert_eq!(tx.as_trits()[..NONCE_OFFSET], original.as_trits()[..NONCE_OFFSET]);
    }

    #[test]
    fn test_zero_mwm() {
        solve(1, 0);
    }

    #[test]
    fn test_low_mwm() {
        solve(2, 1);
        solve(4, 5);
    }

    #[test]
    fn test_mwm_9() {
        solve(num_cpus::get(), 9);
    }

    #[test]
    #[ignore = "slow outside release builds"]
    fn test_mwm_14() {
        solve(num_cpus::get(), 14);
    }

    #[test]
    fn test_rejects_mwm_above_hash_length() {
        let mut tx = sample();
        let result = PowEngine::with_threads(1).search(&mut tx, 244, &CancelToken::new());
        assert_eq!(result.unwrap_err(), Error::InvalidMinWeightMagnitude(244));
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut tx = sample();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = PowEngine::with_threads(2).search(&mut tx, 1, &cancel);
        assert_eq!(result.unwrap_err(), Error::Cancelled);
        assert_eq!(tx, sample());
    }

    #[test]
    fn test_cancel_during_search() {
        let mut tx = sample();
        let cancel = CancelToken::new();
        let threads = 2;
        let engine = engine(threads, None);

        // 243 trailing zeros is never found in practice
        let (result, at_cancel) = thread::scope(|scope| {
            let canceller = scope.spawn(|| {
                thread::sleep(Duration::from_millis(100));
                cancel.cancel();
                engine.hash_count()
            });
            let result = engine.search(&mut tx, HASH_LENGTH, &cancel);
            (result, canceller.join().unwrap())
        });

        assert_eq!(result.unwrap_err(), Error::Cancelled);
        assert_eq!(tx, sample());
        assert!(at_cancel > 0);

        let after = engine.hash_count() - at_cancel;
        let bound = threads as u64 * engine.config().cancel_check_interval * 64;
        assert!(after <= bound, "{} nonces tried after cancellation", after);
    }

    #[test]
    fn test_exhausted_range() {
        let mut tx = sample();
        let engine = engine(8, Some(4));
        let result = engine.search(&mut tx, HASH_LENGTH, &CancelToken::new());
        assert_eq!(result.unwrap_err(), Error::SearchExhausted);
        // threads are capped at the four available counters
        assert_eq!(engine.hash_count(), 4 * 64);
    }

    #[test]
    fn test_solutions_are_deterministic_with_one_thread() {
        let mut a = sample();
        let mut b = sample();
        let engine = engine(1, None);
        engine.search(&mut a, 4, &CancelToken::new()).unwrap();
        engine.search(&mut b, 4, &CancelToken::new()).unwrap();
        assert_eq!(a, b);
    }
}

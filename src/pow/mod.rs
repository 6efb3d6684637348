//! Proof-of-work: searching for a nonce whose transaction hash ends in at
//! least `mwm` zero trits.
//!
//! Workers evaluate 64 nonces per Curl transform using a bit-sliced state.
//! The last 81 trits of the transaction are the nonce: 4 trits select the
//! lane and the remaining 77 carry a per-worker counter.

pub mod bct;
pub mod engine;
pub mod solution;
pub mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use engine::PowEngine;
pub use solution::Solution;

use crate::ternary::HASH_LENGTH;
use crate::transaction::TransactionTrytes;

/// Shared flag for stopping a search from another thread or task.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Whether the transaction hash has at least `mwm` trailing zero trits.
pub fn verify(tx: &TransactionTrytes, mwm: usize) -> bool {
    mwm <= HASH_LENGTH && tx.weight_magnitude() >= mwm
}

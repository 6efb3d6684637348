use serde::{Deserialize, Serialize};

/// A nonce whose transaction hash meets the requested weight magnitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The 27 nonce trytes written into the transaction.
    pub nonce: String,
    /// Curl-P-81 hash of the finalized transaction.
    pub hash: String,
    /// Trailing zero trits of `hash`, at least the requested MWM.
    pub weight_magnitude: usize,
    pub worker: usize,
    pub hash_attempts: u64,
    pub time_taken_ms: u64,
}

impl Solution {
    pub fn hashrate(&self) -> f64 {
        if self.time_taken_ms == 0 {
            return 0.0;
        }
        (self.hash_attempts as f64) / (self.time_taken_ms as f64 / 1000.0)
    }
}

//! Error types for ternary encoding, signing and proof-of-work.

use thiserror::Error;

/// Errors surfaced by every operation in this crate.
///
/// Validation variants are raised before any hashing starts. `Cancelled` is
/// the only one expected during normal operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A tryte string or trit buffer is outside the alphabet or has the wrong length.
    #[error("Invalid ternary encoding: {0}")]
    InvalidEncoding(String),

    /// The seed is not 81 valid trytes.
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// Security level outside 1..=3.
    #[error("Invalid security level {0}, expected 1, 2 or 3")]
    InvalidSecurityLevel(u8),

    /// The bundle hash is not 81 valid trytes.
    #[error("Invalid bundle hash: {0}")]
    InvalidBundleHash(String),

    /// A key's fragment count does not match the requested security level.
    #[error("Security level mismatch: key has {actual} fragments, expected {expected}")]
    SecurityLevelMismatch { expected: usize, actual: usize },

    /// The 9-tryte address checksum does not match the address.
    #[error("Invalid address checksum")]
    InvalidChecksum,

    /// Signature trytes of the wrong length or shape.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// MWM larger than the 243 trits of a hash.
    #[error("Invalid minimum weight magnitude {0}, must be at most 243")]
    InvalidMinWeightMagnitude(usize),

    /// The caller cancelled the proof-of-work search.
    #[error("Proof-of-work search cancelled")]
    Cancelled,

    /// Every worker ran out of counter space without a valid nonce.
    #[error("Proof-of-work search space exhausted")]
    SearchExhausted,
}

pub type Result<T> = std::result::Result<T, Error>;

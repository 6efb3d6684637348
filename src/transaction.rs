//! Fixed-size transaction buffer with a trailing nonce field.

use std::fmt;

use crate::error::{Error, Result};
use crate::sponge::{Curl, CurlRounds, Sponge};
use crate::ternary::{trailing_zeros, trits_to_trytes, trytes_to_trits, Trit, HASH_LENGTH};

pub const TRANSACTION_TRYTES: usize = 2673;
pub const TRANSACTION_TRITS: usize = TRANSACTION_TRYTES * 3;
pub const NONCE_TRYTES: usize = 27;
pub const NONCE_TRITS: usize = NONCE_TRYTES * 3;
/// Trit offset of the nonce, which closes the buffer.
pub const NONCE_OFFSET: usize = TRANSACTION_TRITS - NONCE_TRITS;

#[derive(Clone, PartialEq, Eq)]
pub struct TransactionTrytes {
    trits: Vec<Trit>,
}

impl TransactionTrytes {
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        if trytes.len() != TRANSACTION_TRYTES {
            return Err(Error::InvalidEncoding(format!(
                "transaction must be {} trytes, got {}",
                TRANSACTION_TRYTES,
                trytes.len()
            )));
        }
        Ok(Self {
            trits: trytes_to_trits(trytes)?,
        })
    }

    pub fn from_trits(trits: Vec<Trit>) -> Result<Self> {
        if trits.len() != TRANSACTION_TRITS || !crate::ternary::is_trits(&trits) {
            return Err(Error::InvalidEncoding(format!(
                "transaction must be {} trits",
                TRANSACTION_TRITS
            )));
        }
        Ok(Self { trits })
    }

    pub fn as_trits(&self) -> &[Trit] {
        &self.trits
    }

    pub fn to_trytes(&self) -> String {
        trits_to_trytes(&self.trits).unwrap_or_default()
    }

    pub fn nonce_trits(&self) -> &[Trit] {
        &self.trits[NONCE_OFFSET..]
    }

    pub fn nonce(&self) -> String {
        trits_to_trytes(self.nonce_trits()).unwrap_or_default()
    }

    pub fn set_nonce(&mut self, nonce: &[Trit; NONCE_TRITS]) {
        self.trits[NONCE_OFFSET..].copy_from_slice(nonce);
    }

    pub fn with_nonce(&self, nonce: &[Trit; NONCE_TRITS]) -> Self {
        let mut tx = self.clone();
        tx.set_nonce(nonce);
        tx
    }

    /// Curl-P-81 hash of the whole buffer.
    pub fn hash(&self) -> [Trit; HASH_LENGTH] {
        let mut out = [0; HASH_LENGTH];
        Curl::new(CurlRounds::P81).hash_into(&self.trits, &mut out);
        out
    }

    pub fn hash_trytes(&self) -> String {
        trits_to_trytes(&self.hash()).unwrap_or_default()
    }

    /// Trailing zero trits of the hash.
    pub fn weight_magnitude(&self) -> usize {
        trailing_zeros(&self.hash())
    }
}

impl fmt::Debug for TransactionTrytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionTrytes")
            .field("nonce", &self.nonce())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A buffer of repeating letters with a zeroed nonce.
    pub(crate) fn sample_trytes() -> String {
        let body: String = "ENTANGLED".chars().cycle().take(TRANSACTION_TRYTES - NONCE_TRYTES).collect();
        format!("{}{}", body, "9".repeat(NONCE_TRYTES))
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(TRANSACTION_TRITS, 8019);
        assert_eq!(NONCE_OFFSET, 7938);
        assert_eq!(TRANSACTION_TRITS % HASH_LENGTH, 0);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(TransactionTrytes::from_trytes("ABC"), Err(Error::InvalidEncoding(_))));
        assert!(matches!(TransactionTrytes::from_trits(vec![0; 10]), Err(Error::InvalidEncoding(_))));
        let bad = sample_trytes().replacen('E', "e", 1);
        assert!(matches!(TransactionTrytes::from_trytes(&bad), Err(Error::InvalidEncoding(_))));
    }

    #[test]
    fn test_nonce_round_trip() {
        let tx = TransactionTrytes::from_trytes(&sample_trytes()).unwrap();
        assert_eq!(tx.nonce(), "9".repeat(NONCE_TRYTES));

        let nonce = [1; NONCE_TRITS];
        let updated = tx.with_nonce(&nonce);
        assert_eq!(updated.nonce(), "M".repeat(NONCE_TRYTES));
        assert_eq!(&updated.to_trytes()[..NONCE_OFFSET / 3], &tx.to_trytes()[..NONCE_OFFSET / 3]);
        assert_ne!(updated.hash(), tx.hash());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let tx = TransactionTrytes::from_trytes(&sample_trytes()).unwrap();
        assert_eq!(tx.hash_trytes(), tx.clone().hash_trytes());
        assert_eq!(tx.hash_trytes().len(), 81);
        assert_eq!(tx.weight_magnitude(), trailing_zeros(&tx.hash()));
    }
}

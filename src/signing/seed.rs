use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::ternary::{trits_to_trytes, trytes_to_trits, Trit, HASH_LENGTH, HASH_TRYTES};

/// Number of 2187-tryte key fragments, which fixes signature and address strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SecurityLevel {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

impl SecurityLevel {
    pub fn fragments(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            1 => Ok(SecurityLevel::Low),
            2 => Ok(SecurityLevel::Medium),
            3 => Ok(SecurityLevel::High),
            other => Err(Error::InvalidSecurityLevel(other)),
        }
    }
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> u8 {
        level as u8
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// The 81-tryte root secret. Wiped from memory on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    trits: [Trit; HASH_LENGTH],
}

impl Seed {
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        if trytes.len() != HASH_TRYTES {
            return Err(Error::InvalidSeed(format!(
                "expected {} trytes, got {}",
                HASH_TRYTES,
                trytes.len()
            )));
        }

        let mut decoded = trytes_to_trits(trytes).map_err(|_| {
            Error::InvalidSeed("seed must only contain the characters 9 and A-Z".to_string())
        })?;
        let mut trits = [0; HASH_LENGTH];
        trits.copy_from_slice(&decoded);
        decoded.zeroize();

        Ok(Self { trits })
    }

    /// Draws a fresh seed from the thread-local CSPRNG.
    ///
    /// Uniform trits are equivalent to uniform characters of the tryte alphabet.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut trits = [0; HASH_LENGTH];
        trits.iter_mut().for_each(|t| *t = rng.gen_range(-1..=1));
        Self { trits }
    }

    pub fn as_trits(&self) -> &[Trit; HASH_LENGTH] {
        &self.trits
    }

    /// Reveals the seed as trytes. Callers own the returned secret.
    pub fn to_trytes(&self) -> String {
        trits_to_trytes(&self.trits).unwrap_or_default()
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

//! One-time signatures over a bundle hash.
//!
//! Signing reveals, for each key segment, the hash chain value `13 - n` steps
//! from the private end, where `n` is the normalized bundle tryte. A second
//! signature with the same key over a different bundle reveals earlier chain
//! values and lets anyone forge. Callers must track which indices have signed.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroize;

use super::address::{address_from_digests, fragment_digest, hash_segments, Address};
use super::key::{DerivedKey, FRAGMENT_LENGTH, FRAGMENT_TRYTES, SEGMENTS_PER_FRAGMENT};
use super::seed::SecurityLevel;
use crate::error::{Error, Result};
use crate::sponge::{Sponge, SpongeKind};
use crate::ternary::{
    trits_to_trytes, trytes_to_trits, Trit, HASH_LENGTH, HASH_TRYTES, MAX_TRYTE_VALUE,
};

/// The 81-tryte digest of a bundle, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BundleHash {
    trytes: String,
}

impl BundleHash {
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        if trytes.len() != HASH_TRYTES {
            return Err(Error::InvalidBundleHash(format!(
                "expected {} trytes, got {}",
                HASH_TRYTES,
                trytes.len()
            )));
        }
        if !crate::ternary::is_trytes(trytes) {
            return Err(Error::InvalidBundleHash(
                "bundle hash must only contain the characters 9 and A-Z".to_string(),
            ));
        }
        Ok(Self {
            trytes: trytes.to_string(),
        })
    }

    pub fn as_trytes(&self) -> &str {
        &self.trytes
    }

    /// Shifts tryte values so each 27-tryte chunk sums to zero.
    pub fn normalized(&self) -> NormalizedBundle {
        let mut values = [0i8; HASH_TRYTES];
        for (value, c) in values.iter_mut().zip(self.trytes.chars()) {
            *value = crate::ternary::char_to_tryte_value(c).unwrap_or(0);
        }

        for chunk in values.chunks_mut(SEGMENTS_PER_FRAGMENT) {
            let mut sum: i32 = chunk.iter().map(|&v| v as i32).sum();
            while sum > 0 {
                if let Some(v) = chunk.iter_mut().find(|v| **v > -MAX_TRYTE_VALUE) {
                    *v -= 1;
                }
                sum -= 1;
            }
            while sum < 0 {
                if let Some(v) = chunk.iter_mut().find(|v| **v < MAX_TRYTE_VALUE) {
                    *v += 1;
                }
                sum += 1;
            }
        }

        NormalizedBundle { values }
    }
}

impl TryFrom<String> for BundleHash {
    type Error = Error;

    fn try_from(trytes: String) -> Result<Self> {
        Self::from_trytes(&trytes)
    }
}

impl From<BundleHash> for String {
    fn from(hash: BundleHash) -> String {
        hash.trytes
    }
}

/// Bundle hash tryte values after normalization, three chunks of 27.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBundle {
    values: [i8; HASH_TRYTES],
}

impl NormalizedBundle {
    pub fn values(&self) -> &[i8; HASH_TRYTES] {
        &self.values
    }

    /// Chunk used by signature fragment `fragment`; fragments past the third reuse chunks.
    pub fn chunk(&self, fragment: usize) -> &[i8] {
        let start = (fragment % 3) * SEGMENTS_PER_FRAGMENT;
        &self.values[start..start + SEGMENTS_PER_FRAGMENT]
    }

    /// False when some value is 13: the matching key segment would be signed unhashed.
    pub fn is_secure(&self) -> bool {
        !self.values.contains(&MAX_TRYTE_VALUE)
    }
}

/// `security * 2187` trytes of signature fragments.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    trits: Vec<Trit>,
}

impl Signature {
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        let fragments = trytes.len() / FRAGMENT_TRYTES;
        if trytes.len() % FRAGMENT_TRYTES != 0 || !(1..=3).contains(&fragments) {
            return Err(Error::InvalidSignature(format!(
                "expected 1 to 3 fragments of {} trytes, got {} trytes",
                FRAGMENT_TRYTES,
                trytes.len()
            )));
        }
        let trits = trytes_to_trits(trytes)
            .map_err(|e| Error::InvalidSignature(e.to_string()))?;
        Ok(Self { trits })
    }

    pub fn security(&self) -> Result<SecurityLevel> {
        SecurityLevel::try_from((self.trits.len() / FRAGMENT_LENGTH) as u8)
    }

    pub fn fragments(&self) -> std::slice::Chunks<'_, Trit> {
        self.trits.chunks(FRAGMENT_LENGTH)
    }

    pub fn as_trits(&self) -> &[Trit] {
        &self.trits
    }

    pub fn to_trytes(&self) -> String {
        trits_to_trytes(&self.trits).unwrap_or_default()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({} trytes)", self.trits.len() / 3)
    }
}

/// Signs `bundle` with `key`, which must have been derived at `security`.
///
/// A key must sign at most one bundle hash. This is not checked here.
pub fn sign(
    key: &DerivedKey,
    bundle: &BundleHash,
    security: SecurityLevel,
    kind: SpongeKind,
) -> Result<Signature> {
    if key.security() != security {
        return Err(Error::SecurityLevelMismatch {
            expected: security.fragments(),
            actual: key.security().fragments(),
        });
    }

    let normalized = bundle.normalized();
    if !normalized.is_secure() {
        warn!("Signing a bundle hash whose normalized form contains 13; key segments will be exposed");
    }

    let mut sponge = kind.create();
    let mut trits = Vec::with_capacity(key.as_trits().len());
    for (i, key_fragment) in key.fragments().enumerate() {
        let chunk = normalized.chunk(i);
        let mut fragment = key_fragment.to_vec();
        hash_segments(
            &mut fragment,
            |j| (MAX_TRYTE_VALUE - chunk[j]) as usize,
            sponge.as_mut(),
        );
        trits.extend_from_slice(&fragment);
        fragment.zeroize();
    }

    debug!("Signed bundle {} at security {}", bundle.as_trytes(), security);
    Ok(Signature { trits })
}

/// Completes the hash chains of one signature fragment and digests it.
pub fn signature_digest(
    fragment: &[Trit],
    normalized_chunk: &[i8],
    sponge: &mut dyn Sponge,
) -> [Trit; HASH_LENGTH] {
    let mut chains = fragment.to_vec();
    hash_segments(
        &mut chains,
        |j| (MAX_TRYTE_VALUE + normalized_chunk[j]) as usize,
        sponge,
    );
    fragment_digest(&chains, sponge)
}

/// True when `signature` over `bundle` reproduces `address`.
pub fn validate_signature(
    address: &Address,
    signature: &Signature,
    bundle: &BundleHash,
    kind: SpongeKind,
) -> Result<bool> {
    let normalized = bundle.normalized();
    let mut sponge = kind.create();

    let mut digests = Vec::with_capacity(signature.as_trits().len() / SEGMENTS_PER_FRAGMENT);
    for (i, fragment) in signature.fragments().enumerate() {
        digests.extend_from_slice(&signature_digest(fragment, normalized.chunk(i), sponge.as_mut()));
    }

    Ok(&address_from_digests(&digests, kind)? == address)
}

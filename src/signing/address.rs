use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use super::key::{derive_key, DerivedKey, FRAGMENT_LENGTH};
use super::seed::{SecurityLevel, Seed};
use crate::error::{Error, Result};
use crate::sponge::{Kerl, Sponge, SpongeKind};
use crate::ternary::{
    trits_to_trytes, trytes_to_trits, Trit, HASH_LENGTH, HASH_TRYTES, MAX_TRYTE_VALUE,
};

pub const CHECKSUM_TRYTES: usize = 9;

/// Hash rounds applied to each key segment to reach its public digest.
pub const DIGEST_ROUNDS: usize = 2 * MAX_TRYTE_VALUE as usize;

/// An 81-tryte address, stored without checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    trytes: String,
}

impl Address {
    pub fn from_trits(trits: &[Trit; HASH_LENGTH]) -> Result<Self> {
        Ok(Self {
            trytes: trits_to_trytes(trits)?,
        })
    }

    /// Parses 81 trytes, or 90 trytes whose checksum must match.
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        match trytes.len() {
            HASH_TRYTES => {
                trytes_to_trits(trytes)?;
                Ok(Self {
                    trytes: trytes.to_string(),
                })
            }
            len if len == HASH_TRYTES + CHECKSUM_TRYTES => Self::from_trytes_with_checksum(trytes),
            len => Err(Error::InvalidEncoding(format!(
                "address must be {} or {} trytes, got {}",
                HASH_TRYTES,
                HASH_TRYTES + CHECKSUM_TRYTES,
                len
            ))),
        }
    }

    pub fn from_trytes_with_checksum(trytes: &str) -> Result<Self> {
        if trytes.len() != HASH_TRYTES + CHECKSUM_TRYTES {
            return Err(Error::InvalidEncoding(format!(
                "address with checksum must be {} trytes",
                HASH_TRYTES + CHECKSUM_TRYTES
            )));
        }
        trytes_to_trits(trytes)?;

        let address = Self {
            trytes: trytes[..HASH_TRYTES].to_string(),
        };
        if address.checksum() != trytes[HASH_TRYTES..] {
            return Err(Error::InvalidChecksum);
        }
        Ok(address)
    }

    pub fn as_trytes(&self) -> &str {
        &self.trytes
    }

    pub fn to_trits(&self) -> Vec<Trit> {
        trytes_to_trits(&self.trytes).unwrap_or_default()
    }

    /// Last 9 trytes of the Kerl hash of the address.
    pub fn checksum(&self) -> String {
        let mut digest = [0; HASH_LENGTH];
        Kerl::new().hash_into(&self.to_trits(), &mut digest);
        let trytes = trits_to_trytes(&digest).unwrap_or_default();
        trytes[HASH_TRYTES - CHECKSUM_TRYTES..].to_string()
    }

    pub fn with_checksum(&self) -> String {
        format!("{}{}", self.trytes, self.checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trytes)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(trytes: String) -> Result<Self> {
        Self::from_trytes(&trytes)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> String {
        address.trytes
    }
}

/// Hashes each 243-trit segment of `fragment` in place, `rounds(i)` times for segment `i`.
pub(crate) fn hash_segments(
    fragment: &mut [Trit],
    rounds: impl Fn(usize) -> usize,
    sponge: &mut dyn Sponge,
) {
    let mut buffer = [0; HASH_LENGTH];
    for (i, segment) in fragment.chunks_mut(HASH_LENGTH).enumerate() {
        for _ in 0..rounds(i) {
            sponge.hash_into(segment, &mut buffer);
            segment.copy_from_slice(&buffer);
        }
    }
    buffer.zeroize();
}

pub(crate) fn fragment_digest(fragment: &[Trit], sponge: &mut dyn Sponge) -> [Trit; HASH_LENGTH] {
    let mut digest = [0; HASH_LENGTH];
    sponge.hash_into(fragment, &mut digest);
    digest
}

/// One 243-trit public digest per key fragment.
pub fn key_digests(key: &DerivedKey, kind: SpongeKind) -> Vec<Trit> {
    let mut sponge = kind.create();
    let mut digests = Vec::with_capacity(key.security().fragments() * HASH_LENGTH);
    let mut fragment = vec![0; FRAGMENT_LENGTH];

    for key_fragment in key.fragments() {
        fragment.copy_from_slice(key_fragment);
        hash_segments(&mut fragment, |_| DIGEST_ROUNDS, sponge.as_mut());
        digests.extend_from_slice(&fragment_digest(&fragment, sponge.as_mut()));
    }

    fragment.zeroize();
    digests
}

pub fn address_from_digests(digests: &[Trit], kind: SpongeKind) -> Result<Address> {
    let mut out = [0; HASH_LENGTH];
    kind.create().hash_into(digests, &mut out);
    Address::from_trits(&out)
}

pub fn generate_address(key: &DerivedKey, kind: SpongeKind) -> Result<Address> {
    address_from_digests(&key_digests(key, kind), kind)
}

/// Addresses for indices `start..start + count`, in index order.
pub fn generate_addresses(
    seed: &Seed,
    start: u64,
    security: SecurityLevel,
    count: usize,
    kind: SpongeKind,
) -> Result<Vec<Address>> {
    if start.checked_add(count as u64).is_none() {
        return Err(Error::InvalidEncoding(format!(
            "index range {}+{} overflows 64 bits",
            start, count
        )));
    }

    debug!(
        "Generating {} addresses from index {} at security {}",
        count, start, security
    );

    (0..count as u64)
        .into_par_iter()
        .map(|offset| {
            let key = derive_key(seed, start + offset, security, kind);
            generate_address(&key, kind)
        })
        .collect()
}

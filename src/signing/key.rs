use std::fmt;

use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::seed::{SecurityLevel, Seed};
use crate::error::{Error, Result};
use crate::sponge::{Sponge, SpongeKind};
use crate::ternary::{add_assign, Trit, HASH_LENGTH};

/// 243-trit segments in one key fragment.
pub const SEGMENTS_PER_FRAGMENT: usize = 27;
/// Trits in one key fragment, `27 * 243`.
pub const FRAGMENT_LENGTH: usize = SEGMENTS_PER_FRAGMENT * HASH_LENGTH;
/// Trytes in one key or signature fragment.
pub const FRAGMENT_TRYTES: usize = FRAGMENT_LENGTH / 3;

/// Private key material for one (seed, index, security) triple.
///
/// Holds `security` fragments of 6561 trits. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    trits: Vec<Trit>,
    #[zeroize(skip)]
    security: SecurityLevel,
}

impl DerivedKey {
    /// Wraps raw key trits, inferring the security level from the fragment count.
    pub fn from_trits(trits: Vec<Trit>) -> Result<Self> {
        if trits.is_empty() || trits.len() % FRAGMENT_LENGTH != 0 {
            return Err(Error::InvalidEncoding(format!(
                "key length {} is not a whole number of {}-trit fragments",
                trits.len(),
                FRAGMENT_LENGTH
            )));
        }
        if !crate::ternary::is_trits(&trits) {
            return Err(Error::InvalidEncoding("key contains values outside -1..=1".to_string()));
        }

        let fragments = trits.len() / FRAGMENT_LENGTH;
        let security = SecurityLevel::try_from(u8::try_from(fragments).unwrap_or(u8::MAX))?;
        Ok(Self { trits, security })
    }

    pub fn security(&self) -> SecurityLevel {
        self.security
    }

    pub fn as_trits(&self) -> &[Trit] {
        &self.trits
    }

    pub fn fragments(&self) -> std::slice::Chunks<'_, Trit> {
        self.trits.chunks(FRAGMENT_LENGTH)
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("security", &self.security)
            .field("trits", &"<redacted>")
            .finish()
    }
}

/// Hash of the seed plus `index` in balanced ternary.
pub fn subseed(seed: &Seed, index: u64, sponge: &mut dyn Sponge) -> [Trit; HASH_LENGTH] {
    let mut mixed = *seed.as_trits();
    add_assign(&mut mixed, index);

    let mut out = [0; HASH_LENGTH];
    sponge.hash_into(&mixed, &mut out);
    mixed.zeroize();
    out
}

/// Derives the private key for `index`.
///
/// The same inputs always produce the same key; keys for different indices
/// cannot be linked without the seed.
pub fn derive_key(seed: &Seed, index: u64, security: SecurityLevel, kind: SpongeKind) -> DerivedKey {
    let mut sponge = kind.create();
    let mut sub = subseed(seed, index, sponge.as_mut());

    let mut trits = vec![0; security.fragments() * FRAGMENT_LENGTH];
    sponge.reset();
    sponge.absorb(&sub);
    sponge.squeeze(&mut trits);
    sub.zeroize();

    debug!("Derived key for index {} at security {}", index, security);

    DerivedKey { trits, security }
}

//! Ternary sponge functions.

pub mod curl;
pub mod kerl;

use serde::{Deserialize, Serialize};

pub use curl::{Curl, CurlRounds};
pub use kerl::Kerl;

use crate::ternary::Trit;

/// A sponge absorbing and squeezing 243-trit blocks.
///
/// Inputs that are not a whole number of blocks are processed block by block,
/// the final partial block covering only its leading trits.
pub trait Sponge {
    fn absorb(&mut self, trits: &[Trit]);

    fn squeeze(&mut self, out: &mut [Trit]);

    fn reset(&mut self);

    /// Resets, absorbs `input` and squeezes into `out`.
    fn hash_into(&mut self, input: &[Trit], out: &mut [Trit]) {
        self.reset();
        self.absorb(input);
        self.squeeze(out);
    }
}

/// Which sponge drives key derivation, addresses and signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpongeKind {
    #[default]
    Kerl,
    CurlP27,
    CurlP81,
}

impl SpongeKind {
    pub fn create(self) -> Box<dyn Sponge + Send> {
        match self {
            SpongeKind::Kerl => Box::new(Kerl::new()),
            SpongeKind::CurlP27 => Box::new(Curl::new(CurlRounds::P27)),
            SpongeKind::CurlP81 => Box::new(Curl::new(CurlRounds::P81)),
        }
    }
}

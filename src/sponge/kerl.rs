use sha3::{Digest, Keccak384};

use super::Sponge;
use crate::ternary::bigint::{bytes_to_trits, trits_to_bytes, BYTE_LENGTH};
use crate::ternary::{Trit, HASH_LENGTH};

/// Keccak-384 driven over ternary blocks.
///
/// Each squeeze feeds the bitwise complement of the digest back into a fresh
/// Keccak state, so successive squeezes keep producing new blocks.
#[derive(Clone, Default)]
pub struct Kerl {
    keccak: Keccak384,
}

impl Kerl {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sponge for Kerl {
    fn absorb(&mut self, trits: &[Trit]) {
        for chunk in trits.chunks(HASH_LENGTH) {
            let mut block = [0; HASH_LENGTH];
            block[..chunk.len()].copy_from_slice(chunk);
            self.keccak.update(trits_to_bytes(&block));
        }
    }

    fn squeeze(&mut self, out: &mut [Trit]) {
        for chunk in out.chunks_mut(HASH_LENGTH) {
            let mut bytes = [0u8; BYTE_LENGTH];
            bytes.copy_from_slice(&self.keccak.finalize_reset());

            let trits = bytes_to_trits(&bytes);
            let len = chunk.len();
            chunk.copy_from_slice(&trits[..len]);

            bytes.iter_mut().for_each(|b| *b = !*b);
            self.keccak.update(bytes);
        }
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.keccak);
    }
}

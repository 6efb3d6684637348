//! Balanced ternary primitives.
//!
//! A trit is an `i8` restricted to `{-1, 0, 1}`. A tryte is three trits,
//! little-endian, written as one character of `9ABCDEFGHIJKLMNOPQRSTUVWXYZ`
//! where `9` is zero, `A..M` are 1..13 and `N..Z` are -13..-1.

pub mod bigint;
pub mod int;
pub mod trytes;

pub use int::{add_assign, int_to_trits, trits_to_int, u64_to_trits};
pub use trytes::{
    bytes_to_trytes, char_to_tryte_value, is_trytes, trits_to_trytes, tryte_value_to_char,
    trytes_to_bytes, trytes_to_trits,
};

pub type Trit = i8;

/// Trits in one sponge hash.
pub const HASH_LENGTH: usize = 243;
/// Trytes in one sponge hash.
pub const HASH_TRYTES: usize = 81;
pub const TRITS_PER_TRYTE: usize = 3;
pub const TRYTE_ALPHABET: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Largest absolute value a single tryte can hold.
pub const MAX_TRYTE_VALUE: i8 = 13;

/// Returns true if every element is -1, 0 or 1.
pub fn is_trits(trits: &[Trit]) -> bool {
    trits.iter().all(|t| (-1..=1).contains(t))
}

/// Number of zero trits at the end of `trits`.
pub fn trailing_zeros(trits: &[Trit]) -> usize {
    trits.iter().rev().take_while(|&&t| t == 0).count()
}

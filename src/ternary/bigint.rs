//! Conversion between a 243-trit hash and the 384-bit integers Keccak consumes.
//!
//! The first 242 trits are read as a balanced ternary number and stored as a
//! big-endian two's complement integer. The last trit is always zero on the
//! way in and on the way out.

use std::cmp::Ordering;

use super::{Trit, HASH_LENGTH};

pub const BYTE_LENGTH: usize = 48;
const WORDS: usize = BYTE_LENGTH / 4;

/// Little-endian 32-bit limbs.
type Words = [u32; WORDS];

/// `(3^242 - 1) / 2`, the largest magnitude 242 balanced trits can hold.
const HALF_3: Words = half_3();

const fn half_3() -> Words {
    let mut words = [0u32; WORDS];
    let mut i = 0;
    while i < HASH_LENGTH - 1 {
        let mut carry: u64 = 1;
        let mut j = 0;
        while j < WORDS {
            let v = words[j] as u64 * 3 + carry;
            words[j] = v as u32;
            carry = v >> 32;
            j += 1;
        }
        i += 1;
    }
    words
}

fn add(lhs: &mut Words, rhs: &Words) {
    let mut carry = 0u64;
    for (l, r) in lhs.iter_mut().zip(rhs) {
        let v = *l as u64 + *r as u64 + carry;
        *l = v as u32;
        carry = v >> 32;
    }
}

fn add_small(lhs: &mut Words, value: u32) {
    let mut carry = value as u64;
    for l in lhs.iter_mut() {
        if carry == 0 {
            break;
        }
        let v = *l as u64 + carry;
        *l = v as u32;
        carry = v >> 32;
    }
}

fn sub(lhs: &mut Words, rhs: &Words) {
    let mut borrow = 0i64;
    for (l, r) in lhs.iter_mut().zip(rhs) {
        let v = *l as i64 - *r as i64 - borrow;
        if v < 0 {
            *l = (v + (1i64 << 32)) as u32;
            borrow = 1;
        } else {
            *l = v as u32;
            borrow = 0;
        }
    }
}

fn not(words: &mut Words) {
    words.iter_mut().for_each(|w| *w = !*w);
}

fn cmp(lhs: &Words, rhs: &Words) -> Ordering {
    lhs.iter().rev().cmp(rhs.iter().rev())
}

fn mul3(words: &mut Words) {
    let mut carry = 0u64;
    for w in words.iter_mut() {
        let v = *w as u64 * 3 + carry;
        *w = v as u32;
        carry = v >> 32;
    }
}

fn divmod3(words: &mut Words) -> u32 {
    let mut rem = 0u64;
    for w in words.iter_mut().rev() {
        let lhs = (rem << 32) | *w as u64;
        *w = (lhs / 3) as u32;
        rem = lhs % 3;
    }
    rem as u32
}

/// Packs the first 242 trits into 48 big-endian bytes.
pub fn trits_to_bytes(trits: &[Trit; HASH_LENGTH]) -> [u8; BYTE_LENGTH] {
    // Horner's rule modulo 2^384 gives the two's complement form directly.
    let mut words: Words = [0; WORDS];
    for &trit in trits[..HASH_LENGTH - 1].iter().rev() {
        mul3(&mut words);
        match trit {
            1 => add_small(&mut words, 1),
            -1 => add(&mut words, &[u32::MAX; WORDS]),
            _ => {}
        }
    }

    let mut bytes = [0u8; BYTE_LENGTH];
    for (chunk, word) in bytes.chunks_mut(4).zip(words.iter().rev()) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    bytes
}

/// Unpacks 48 big-endian bytes into 243 trits, reducing modulo `3^242`.
pub fn bytes_to_trits(bytes: &[u8; BYTE_LENGTH]) -> [Trit; HASH_LENGTH] {
    let mut words: Words = [0; WORDS];
    for (word, chunk) in words.iter_mut().rev().zip(bytes.chunks(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let mut flip = false;
    if words[WORDS - 1] >> 31 == 0 {
        add(&mut words, &HALF_3);
    } else {
        // |value| - 1
        not(&mut words);
        if cmp(&words, &HALF_3) == Ordering::Greater {
            sub(&mut words, &HALF_3);
            flip = true;
        } else {
            add_small(&mut words, 1);
            let mut tmp = HALF_3;
            sub(&mut tmp, &words);
            words = tmp;
        }
    }

    let mut trits = [0; HASH_LENGTH];
    for trit in trits[..HASH_LENGTH - 1].iter_mut() {
        let digit = divmod3(&mut words) as Trit - 1;
        *trit = if flip { -digit } else { digit };
    }
    trits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ternary::{int_to_trits, trits_to_int};

    fn hash_from_int(value: i64) -> [Trit; HASH_LENGTH] {
        let mut trits = [0; HASH_LENGTH];
        let digits = int_to_trits(value);
        trits[..digits.len()].copy_from_slice(&digits);
        trits
    }

    #[test]
    fn test_small_values_encode_as_twos_complement() {
        let bytes = trits_to_bytes(&hash_from_int(1));
        assert_eq!(bytes[BYTE_LENGTH - 1], 1);
        assert!(bytes[..BYTE_LENGTH - 1].iter().all(|&b| b == 0));

        let bytes = trits_to_bytes(&hash_from_int(-1));
        assert!(bytes.iter().all(|&b| b == 0xff));

        let bytes = trits_to_bytes(&hash_from_int(300));
        assert_eq!(&bytes[BYTE_LENGTH - 2..], &[1, 44]);
    }

    #[test]
    fn test_round_trip_small_values() {
        for value in [0i64, 1, -1, 42, -42, 1 << 40, -(1 << 40)] {
            let trits = bytes_to_trits(&trits_to_bytes(&hash_from_int(value)));
            assert_eq!(trits[HASH_LENGTH - 1], 0);
            assert_eq!(trits_to_int(&trits[..60]).unwrap(), value);
            assert!(trits[60..].iter().all(|&t| t == 0));
        }
    }

    #[test]
    fn test_round_trip_extremes() {
        let mut max = [1; HASH_LENGTH];
        max[HASH_LENGTH - 1] = 0;
        assert_eq!(bytes_to_trits(&trits_to_bytes(&max)), max);

        let mut min = [-1; HASH_LENGTH];
        min[HASH_LENGTH - 1] = 0;
        assert_eq!(bytes_to_trits(&trits_to_bytes(&min)), min);
    }

    #[test]
    fn test_round_trip_mixed_pattern() {
        let mut trits = [0; HASH_LENGTH];
        for (i, trit) in trits[..HASH_LENGTH - 1].iter_mut().enumerate() {
            *trit = ((i * 7 + 3) % 3) as Trit - 1;
        }
        assert_eq!(bytes_to_trits(&trits_to_bytes(&trits)), trits);
    }

    #[test]
    fn test_last_trit_ignored() {
        let mut trits = hash_from_int(5);
        let expected = trits_to_bytes(&trits);
        trits[HASH_LENGTH - 1] = 1;
        assert_eq!(trits_to_bytes(&trits), expected);
    }

    #[test]
    fn test_any_bytes_decode_to_trits() {
        for fill in [0x00u8, 0x7f, 0x80, 0xff, 0x5a] {
            let trits = bytes_to_trits(&[fill; BYTE_LENGTH]);
            assert!(trits.iter().all(|t| (-1..=1).contains(t)));
            assert_eq!(trits[HASH_LENGTH - 1], 0);
        }
    }
}

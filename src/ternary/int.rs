use super::Trit;
use crate::error::{Error, Result};

/// Balanced ternary digits of `value`, least significant first, minimal length.
pub fn u64_to_trits(mut value: u64) -> Vec<Trit> {
    let mut trits = Vec::new();
    while value != 0 {
        let rem = value % 3;
        value /= 3;
        if rem == 2 {
            trits.push(-1);
            value += 1;
        } else {
            trits.push(rem as Trit);
        }
    }
    trits
}

pub fn int_to_trits(value: i64) -> Vec<Trit> {
    let mut trits = u64_to_trits(value.unsigned_abs());
    if value < 0 {
        trits.iter_mut().for_each(|t| *t = -*t);
    }
    trits
}

/// Reads a little-endian balanced ternary number.
pub fn trits_to_int(trits: &[Trit]) -> Result<i64> {
    trits.iter().rev().try_fold(0i64, |acc, &trit| {
        if !(-1..=1).contains(&trit) {
            return Err(Error::InvalidEncoding(format!("{} is not a trit", trit)));
        }
        acc.checked_mul(3)
            .and_then(|v| v.checked_add(trit as i64))
            .ok_or_else(|| Error::InvalidEncoding("trits overflow a 64-bit integer".to_string()))
    })
}

/// Adds `value` to the balanced number held in `trits`, in place.
///
/// Carries past the last trit are dropped, so the sum wraps modulo `3^len`.
pub fn add_assign(trits: &mut [Trit], value: u64) {
    let addend = u64_to_trits(value);
    let mut carry: Trit = 0;
    for (i, trit) in trits.iter_mut().enumerate() {
        let other = addend.get(i).copied().unwrap_or(0);
        if other == 0 && carry == 0 && i >= addend.len() {
            break;
        }
        let sum = *trit + other + carry;
        let digit = (sum + 4).rem_euclid(3) - 1;
        carry = (sum - digit) / 3;
        *trit = digit;
    }
}

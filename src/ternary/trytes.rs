use super::{Trit, MAX_TRYTE_VALUE, TRITS_PER_TRYTE, TRYTE_ALPHABET};
use crate::error::{Error, Result};

/// Balanced value of a tryte character, `None` outside the alphabet.
pub fn char_to_tryte_value(c: char) -> Option<i8> {
    let index = TRYTE_ALPHABET.iter().position(|&b| b as char == c)? as i8;
    Some(if index > MAX_TRYTE_VALUE { index - 27 } else { index })
}

/// Character for a balanced tryte value in `-13..=13`.
pub fn tryte_value_to_char(value: i8) -> Option<char> {
    if !(-MAX_TRYTE_VALUE..=MAX_TRYTE_VALUE).contains(&value) {
        return None;
    }
    let index = if value < 0 { value + 27 } else { value };
    Some(TRYTE_ALPHABET[index as usize] as char)
}

pub fn is_trytes(trytes: &str) -> bool {
    trytes.chars().all(|c| char_to_tryte_value(c).is_some())
}

fn value_to_trits(mut value: i8) -> [Trit; TRITS_PER_TRYTE] {
    let mut out = [0; TRITS_PER_TRYTE];
    for trit in out.iter_mut() {
        let rem = value.rem_euclid(3);
        if rem == 2 {
            *trit = -1;
            value = (value + 1) / 3;
        } else {
            *trit = rem;
            value = (value - rem) / 3;
        }
    }
    out
}

/// Decodes a tryte string into trits, three per character.
pub fn trytes_to_trits(trytes: &str) -> Result<Vec<Trit>> {
    let mut trits = Vec::with_capacity(trytes.len() * TRITS_PER_TRYTE);
    for (position, c) in trytes.chars().enumerate() {
        let value = char_to_tryte_value(c).ok_or_else(|| {
            Error::InvalidEncoding(format!("character {:?} at position {} is not a tryte", c, position))
        })?;
        trits.extend_from_slice(&value_to_trits(value));
    }
    Ok(trits)
}

/// Encodes trits as a tryte string. The length must be a multiple of three.
pub fn trits_to_trytes(trits: &[Trit]) -> Result<String> {
    if trits.len() % TRITS_PER_TRYTE != 0 {
        return Err(Error::InvalidEncoding(format!(
            "{} trits is not a whole number of trytes",
            trits.len()
        )));
    }

    trits
        .chunks(TRITS_PER_TRYTE)
        .map(|chunk| {
            if !super::is_trits(chunk) {
                return Err(Error::InvalidEncoding(format!("{:?} is not a valid trit triple", chunk)));
            }
            let value = chunk[0] + chunk[1] * 3 + chunk[2] * 9;
            tryte_value_to_char(value)
                .ok_or_else(|| Error::InvalidEncoding(format!("tryte value {} out of range", value)))
        })
        .collect()
}

/// Encodes each byte as two trytes: `byte % 27` then `byte / 27`.
pub fn bytes_to_trytes(bytes: &[u8]) -> String {
    let mut trytes = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        trytes.push(TRYTE_ALPHABET[(byte % 27) as usize] as char);
        trytes.push(TRYTE_ALPHABET[(byte / 27) as usize] as char);
    }
    trytes
}

/// Inverse of [`bytes_to_trytes`].
pub fn trytes_to_bytes(trytes: &str) -> Result<Vec<u8>> {
    if trytes.len() % 2 != 0 {
        return Err(Error::InvalidEncoding("odd number of trytes for byte decoding".to_string()));
    }

    let index = |c: u8| -> Result<u16> {
        TRYTE_ALPHABET
            .iter()
            .position(|&b| b == c)
            .map(|i| i as u16)
            .ok_or_else(|| Error::InvalidEncoding(format!("character {:?} is not a tryte", c as char)))
    };

    trytes
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let value = index(pair[0])? + index(pair[1])? * 27;
            u8::try_from(value)
                .map_err(|_| Error::InvalidEncoding(format!("tryte pair {} does not encode a byte", value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tryte_values() {
        assert_eq!(char_to_tryte_value('9'), Some(0));
        assert_eq!(char_to_tryte_value('A'), Some(1));
        assert_eq!(char_to_tryte_value('M'), Some(13));
        assert_eq!(char_to_tryte_value('N'), Some(-13));
        assert_eq!(char_to_tryte_value('Z'), Some(-1));
        assert_eq!(char_to_tryte_value('a'), None);
        assert_eq!(tryte_value_to_char(-1), Some('Z'));
        assert_eq!(tryte_value_to_char(14), None);
    }

    #[test]
    fn test_known_trits() {
        assert_eq!(trytes_to_trits("9").unwrap(), vec![0, 0, 0]);
        assert_eq!(trytes_to_trits("A").unwrap(), vec![1, 0, 0]);
        assert_eq!(trytes_to_trits("M").unwrap(), vec![1, 1, 1]);
        assert_eq!(trytes_to_trits("N").unwrap(), vec![-1, -1, -1]);
        assert_eq!(trytes_to_trits("Z").unwrap(), vec![-1, 0, 0]);
    }

    #[test]
    fn test_every_tryte_round_trips() {
        let alphabet = std::str::from_utf8(TRYTE_ALPHABET).unwrap();
        let trits = trytes_to_trits(alphabet).unwrap();
        assert_eq!(trits.len(), 81);
        assert_eq!(trits_to_trytes(&trits).unwrap(), alphabet);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(trytes_to_trits("AB1"), Err(Error::InvalidEncoding(_))));
        assert!(matches!(trits_to_trytes(&[0, 1]), Err(Error::InvalidEncoding(_))));
        assert!(matches!(trits_to_trytes(&[0, 2, 0]), Err(Error::InvalidEncoding(_))));
        assert!(!is_trytes("HELLO world"));
    }

    #[test]
    fn test_bytes_round_trip() {
        let message = b"Entangled \x00\xff";
        let trytes = bytes_to_trytes(message);
        assert_eq!(trytes.len(), message.len() * 2);
        assert_eq!(trytes_to_bytes(&trytes).unwrap(), message.to_vec());
        assert_eq!(bytes_to_trytes(b"A"), "KB");
    }

    #[test]
    fn test_bytes_rejects_overflow() {
        // 26 + 26 * 27 does not fit in a byte
        assert!(trytes_to_bytes("ZZ").is_err());
        assert!(trytes_to_bytes("A").is_err());
    }
}

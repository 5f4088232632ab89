//! Base83 digits, the character set every BlurHash field is written in.
//!
//! Fields are fixed-width big-endian numbers: one digit for the size flag and
//! the AC scale, four for the average color, two per AC component.

use crate::error::{BlurHashError, Result};

const DIGITS: &[u8; 83] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz#$%*+,-.:;=?@[]^_{|}~";

/// Marks ASCII bytes that are not digits.
const NOT_A_DIGIT: u8 = u8::MAX;

/// Digit value per ASCII byte.
static DIGIT_VALUES: [u8; 128] = digit_values();

const fn digit_values() -> [u8; 128] {
    let mut values = [NOT_A_DIGIT; 128];
    let mut i = 0;
    while i < DIGITS.len() {
        values[DIGITS[i] as usize] = i as u8;
        i += 1;
    }
    values
}

fn digit_value(byte: u8) -> Option<u64> {
    DIGIT_VALUES
        .get(byte as usize)
        .filter(|&&v| v != NOT_A_DIGIT)
        .map(|&v| u64::from(v))
}

/// Read a base83 field.
///
/// # Errors
///
/// [`BlurHashError::InvalidBase83Character`] for a character outside the
/// alphabet, [`BlurHashError::Encoding`] if the field overflows `u64`.
///
/// ```
/// use lazy_blurhash::base83::decode;
/// assert_eq!(decode("~").unwrap(), 82);
/// assert_eq!(decode("10").unwrap(), 83);
/// ```
pub fn decode(field: &str) -> Result<u64> {
    field.chars().try_fold(0u64, |acc, ch| {
        let digit = u8::try_from(ch)
            .ok()
            .and_then(digit_value)
            .ok_or(BlurHashError::InvalidBase83Character(ch))?;
        acc.checked_mul(83)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| BlurHashError::Encoding(format!("base83 field {field:?} overflows u64")))
    })
}

/// Whether `ch` belongs to the base83 alphabet.
#[inline]
pub fn is_valid_char(ch: char) -> bool {
    u8::try_from(ch).ok().and_then(digit_value).is_some()
}

/// Write `value` as exactly `width` base83 digits, left-padded with `0`.
///
/// # Errors
///
/// [`BlurHashError::Encoding`] if `value` needs more than `width` digits.
///
/// ```
/// use lazy_blurhash::base83::encode;
/// assert_eq!(encode(82, 1).unwrap(), "~");
/// assert_eq!(encode(83, 4).unwrap(), "0010");
/// ```
pub fn encode(value: u64, width: usize) -> Result<String> {
    let limit = u32::try_from(width)
        .ok()
        .and_then(|w| 83u64.checked_pow(w));
    if limit.is_some_and(|limit| value >= limit) {
        return Err(BlurHashError::Encoding(format!(
            "{value} does not fit in {width} base83 digits"
        )));
    }

    let mut out = vec![b'0'; width];
    let mut rest = value;
    for slot in out.iter_mut().rev() {
        *slot = DIGITS[(rest % 83) as usize];
        rest /= 83;
    }
    Ok(out.into_iter().map(char::from).collect())
}

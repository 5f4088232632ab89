//! The validated BlurHash string.
//!
//! Layout: one size character, one quantized maximum-AC character, four
//! characters of average color, then two characters per AC component.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::base83;
use crate::error::{BlurHashError, Result};

/// Shortest possible signature: a single DC component.
pub const MIN_LENGTH: usize = 6;

/// Largest packed average color (24-bit sRGB).
const MAX_DC: u64 = 0xFF_FFFF;
/// Largest packed AC triple: three 19-level channels.
const MAX_AC: u64 = 19 * 19 * 19 - 1;

/// An immutable, well-formed BlurHash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedSignature(String);

impl EncodedSignature {
    /// Validate `blurhash` and wrap it.
    ///
    /// # Errors
    ///
    /// * [`BlurHashError::InvalidLength`] if the string is shorter than six
    ///   characters or does not match the length its size character implies.
    /// * [`BlurHashError::InvalidBase83Character`] on any character outside
    ///   the base83 alphabet.
    /// * [`BlurHashError::Encoding`] if the average color or an AC value is
    ///   outside the range the encoder can produce.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_blurhash::EncodedSignature;
    /// let sig = EncodedSignature::parse("LEHV6nWB2yk8pyo0adR*.7kCMdnj").unwrap();
    /// assert_eq!(sig.components(), (4, 3));
    /// ```
    pub fn parse(blurhash: &str) -> Result<Self> {
        let (cx, cy) = components(blurhash)?;
        let expected = expected_length(cx, cy);
        if blurhash.len() != expected {
            return Err(BlurHashError::InvalidLength {
                expected,
                actual: blurhash.len(),
            });
        }
        if let Some(bad) = blurhash.chars().find(|&c| !base83::is_valid_char(c)) {
            return Err(BlurHashError::InvalidBase83Character(bad));
        }
        let dc = base83::decode(&blurhash[2..6])?;
        if dc > MAX_DC {
            return Err(BlurHashError::Encoding(format!(
                "DC value {dc} does not fit in 24-bit RGB"
            )));
        }
        for start in (6..blurhash.len()).step_by(2) {
            let ac = base83::decode(&blurhash[start..start + 2])?;
            if ac > MAX_AC {
                return Err(BlurHashError::Encoding(format!(
                    "AC value {ac} at offset {start} exceeds {MAX_AC}"
                )));
            }
        }
        Ok(Self(blurhash.to_owned()))
    }

    /// Wrap a string the encoder just produced.
    pub(crate) fn from_encoded(blurhash: String) -> Self {
        debug_assert!(Self::parse(&blurhash).is_ok(), "encoder produced {blurhash:?}");
        Self(blurhash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Number of horizontal and vertical basis components.
    pub fn components(&self) -> (u32, u32) {
        size_flag_to_components(self.digit(0..1))
    }

    /// Total number of basis components, DC included.
    pub fn component_count(&self) -> usize {
        let (cx, cy) = self.components();
        (cx * cy) as usize
    }

    /// The quantized maximum AC magnitude (0..=82).
    pub fn quantized_max_ac(&self) -> u64 {
        self.digit(1..2)
    }

    /// The sRGB average color carried by the DC component.
    pub fn average_color(&self) -> [u8; 3] {
        let dc = self.digit(2..6);
        [(dc >> 16) as u8, ((dc >> 8) & 255) as u8, (dc & 255) as u8]
    }

    /// The packed AC values, two characters each, in row-major basis order.
    pub fn ac_values(&self) -> impl Iterator<Item = u64> + '_ {
        (1..self.component_count()).map(move |idx| {
            let start = 4 + idx * 2;
            self.digit(start..start + 2)
        })
    }

    fn digit(&self, range: std::ops::Range<usize>) -> u64 {
        // Every character was checked against the alphabet in `parse`.
        base83::decode(&self.0[range]).unwrap_or_default()
    }
}

/// Extract the number of X and Y components from a BlurHash string.
///
/// Only the size character is inspected; use [`EncodedSignature::parse`] to
/// validate the whole string.
///
/// # Errors
///
/// Returns [`BlurHashError::InvalidLength`] if the BlurHash is shorter than
/// six characters.
pub fn components(blurhash: &str) -> Result<(u32, u32)> {
    if blurhash.len() < MIN_LENGTH {
        return Err(BlurHashError::InvalidLength {
            expected: MIN_LENGTH,
            actual: blurhash.len(),
        });
    }
    let size_char = blurhash
        .chars()
        .next()
        .filter(|c| base83::is_valid_char(*c))
        .ok_or_else(|| {
            BlurHashError::InvalidBase83Character(blurhash.chars().next().unwrap_or('\0'))
        })?;
    let size_flag = base83::decode(size_char.encode_utf8(&mut [0; 4]))?;
    if size_flag > 80 {
        return Err(BlurHashError::Encoding(format!(
            "size flag {size_flag} exceeds 9x9 components"
        )));
    }
    Ok(size_flag_to_components(size_flag))
}

/// Length of a signature with `cx * cy` components.
pub fn expected_length(cx: u32, cy: u32) -> usize {
    4 + 2 * (cx * cy) as usize
}

pub(crate) fn components_to_size_flag(cx: u32, cy: u32) -> u64 {
    ((cx - 1) + (cy - 1) * 9) as u64
}

fn size_flag_to_components(size_flag: u64) -> (u32, u32) {
    ((size_flag % 9 + 1) as u32, (size_flag / 9 + 1) as u32)
}

impl fmt::Display for EncodedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EncodedSignature {
    type Err = BlurHashError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EncodedSignature {
    type Error = BlurHashError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EncodedSignature> for String {
    fn from(value: EncodedSignature) -> Self {
        value.0
    }
}

impl AsRef<str> for EncodedSignature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_HASH: &str = "LEHV6nWB2yk8pyo0adR*.7kCMdnj";

    #[test]
    fn test_parse_known_hash() {
        let sig = EncodedSignature::parse(KNOWN_HASH).unwrap();
        assert_eq!(sig.components(), (4, 3));
        assert_eq!(sig.component_count(), 12);
        assert_eq!(sig.ac_values().count(), 11);
        assert_eq!(sig.to_string(), KNOWN_HASH);
    }

    #[test]
    fn test_components_too_short() {
        assert!(matches!(
            components("ABC"),
            Err(BlurHashError::InvalidLength { expected: 6, actual: 3 })
        ));
    }

    #[test]
    fn test_parse_rejects_truncated() {
        // Size flag 'L' implies 4x3 = 28 characters.
        assert!(matches!(
            EncodedSignature::parse("L00000"),
            Err(BlurHashError::InvalidLength { expected: 28, actual: 6 })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_character() {
        assert!(matches!(
            EncodedSignature::parse("00000!"),
            Err(BlurHashError::InvalidBase83Character('!'))
        ));
        assert!(EncodedSignature::parse("!EHV6nWB2yk8pyo0adR*.7kCMdnj").is_err());
    }

    #[test]
    fn test_parse_rejects_oversized_flag() {
        // '~' = 82, beyond the 9x9 addressable range.
        assert!(EncodedSignature::parse(&format!("~{}", "0".repeat(5))).is_err());
    }

    #[test]
    fn test_parse_rejects_dc_beyond_24_bits() {
        let dc = base83::encode(1 << 24, 4).unwrap();
        assert!(matches!(
            EncodedSignature::parse(&format!("00{dc}")),
            Err(BlurHashError::Encoding(_))
        ));
        assert!(matches!(
            EncodedSignature::parse("00~~~~"),
            Err(BlurHashError::Encoding(_))
        ));
        let max = base83::encode(0xFF_FFFF, 4).unwrap();
        assert_eq!(
            EncodedSignature::parse(&format!("00{max}")).unwrap().average_color(),
            [255, 255, 255]
        );
    }

    #[test]
    fn test_parse_rejects_ac_beyond_quantization_range() {
        // size flag 1 = 2x1, one AC pair; 19^3 = 6859 is one past the largest.
        let ac = base83::encode(19 * 19 * 19, 2).unwrap();
        assert!(matches!(
            EncodedSignature::parse(&format!("100000{ac}")),
            Err(BlurHashError::Encoding(_))
        ));
        let ok = base83::encode(19 * 19 * 19 - 1, 2).unwrap();
        assert!(EncodedSignature::parse(&format!("100000{ok}")).is_ok());
    }

    #[test]
    fn test_average_color_unpacks_dc() {
        // size 0 (1x1), max AC 0, DC = 0xFF0000
        let dc = base83::encode(0xFF0000, 4).unwrap();
        let sig = EncodedSignature::parse(&format!("00{dc}")).unwrap();
        assert_eq!(sig.average_color(), [255, 0, 0]);
        assert_eq!(sig.ac_values().count(), 0);
    }

    #[test]
    fn test_size_flag_mapping() {
        for cx in 1..=9 {
            for cy in 1..=9 {
                assert_eq!(size_flag_to_components(components_to_size_flag(cx, cy)), (cx, cy));
            }
        }
    }

    #[test]
    fn test_serde_validates() {
        let json = format!("\"{KNOWN_HASH}\"");
        let sig: EncodedSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig.as_str(), KNOWN_HASH);
        assert!(serde_json::from_str::<EncodedSignature>("\"L000\"").is_err());
    }
}

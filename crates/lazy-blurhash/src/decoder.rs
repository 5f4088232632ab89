//! BlurHash decoding: signature -> RGB pixels at any resolution.

use std::f64::consts::PI;

use crate::color::{linear_to_srgb, sign_pow, srgb_to_linear};
use crate::error::{BlurHashError, Result};
use crate::sampler::PixelGrid;
use crate::signature::EncodedSignature;

/// Cap on rendered dimensions, so a hostile caller cannot request a
/// multi-gigabyte buffer.
pub const MAX_DIMENSION: u32 = 10_000;

/// Reconstruct an RGB image from a signature.
///
/// `punch` scales the AC contrast; `1.0` reproduces the encoded image.
///
/// # Errors
///
/// Returns [`BlurHashError::InvalidParameter`] if either dimension is zero or
/// larger than [`MAX_DIMENSION`].
///
/// # Examples
///
/// ```
/// use lazy_blurhash::{decode, EncodedSignature};
/// let sig = EncodedSignature::parse("LEHV6nWB2yk8pyo0adR*.7kCMdnj").unwrap();
/// let grid = decode(&sig, 32, 32, 1.0).unwrap();
/// assert_eq!(grid.as_bytes().len(), 32 * 32 * 3);
/// ```
pub fn decode(
    signature: &EncodedSignature,
    width: u32,
    height: u32,
    punch: f64,
) -> Result<PixelGrid> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(BlurHashError::invalid(format!(
            "render size {width}x{height} must be within 1..={MAX_DIMENSION}"
        )));
    }

    let colours = coefficients(signature, punch);
    let (size_x, size_y) = signature.components();
    let (size_x, size_y) = (size_x as usize, size_y as usize);

    let w = width as usize;
    let h = height as usize;
    let cos_x: Vec<Vec<f64>> = (0..size_x)
        .map(|i| (0..w).map(|x| (PI * x as f64 * i as f64 / w as f64).cos()).collect())
        .collect();
    let cos_y: Vec<Vec<f64>> = (0..size_y)
        .map(|j| (0..h).map(|y| (PI * y as f64 * j as f64 / h as f64).cos()).collect())
        .collect();

    let mut pixels = Vec::with_capacity(w * h * 3);
    for y in 0..h {
        for x in 0..w {
            let mut rgb = [0.0f64; 3];
            for (j, cos_y_row) in cos_y.iter().enumerate() {
                let cy = cos_y_row[y];
                for (i, cos_x_row) in cos_x.iter().enumerate() {
                    let basis = cos_x_row[x] * cy;
                    let colour = &colours[i + j * size_x];
                    rgb[0] += colour[0] * basis;
                    rgb[1] += colour[1] * basis;
                    rgb[2] += colour[2] * basis;
                }
            }
            pixels.extend(rgb.iter().map(|&c| linear_to_srgb(c)));
        }
    }

    PixelGrid::new(width, height, pixels)
}

/// Parse a raw string and decode it in one step.
pub fn decode_str(blurhash: &str, width: u32, height: u32, punch: f64) -> Result<PixelGrid> {
    decode(&EncodedSignature::parse(blurhash)?, width, height, punch)
}

/// Dequantize the basis coefficients into linear RGB, DC first.
fn coefficients(signature: &EncodedSignature, punch: f64) -> Vec<[f64; 3]> {
    let max_value = (signature.quantized_max_ac() as f64 + 1.0) / 166.0 * punch;
    let [r, g, b] = signature.average_color();

    let mut colours = Vec::with_capacity(signature.component_count());
    colours.push([srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)]);
    colours.extend(signature.ac_values().map(|value| {
        let unpack = |q: u64| sign_pow((q as f64 - 9.0) / 9.0, 2.0) * max_value;
        [
            unpack(value / (19 * 19)),
            unpack((value / 19) % 19),
            unpack(value % 19),
        ]
    }));
    colours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;

    const KNOWN_HASH: &str = "LEHV6nWB2yk8pyo0adR*.7kCMdnj";

    #[test]
    fn test_decode_output_size() {
        let grid = decode_str(KNOWN_HASH, 32, 16, 1.0).unwrap();
        assert_eq!((grid.width(), grid.height()), (32, 16));
        assert_eq!(grid.as_bytes().len(), 32 * 16 * 3);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_str("ABC", 32, 32, 1.0).is_err());
        assert!(decode_str("L00000", 32, 32, 1.0).is_err());
    }

    #[test]
    fn test_decode_rejects_zero_size() {
        let sig = EncodedSignature::parse(KNOWN_HASH).unwrap();
        assert!(matches!(
            decode(&sig, 0, 4, 1.0),
            Err(BlurHashError::InvalidParameter(_))
        ));
        assert!(decode(&sig, 4, MAX_DIMENSION + 1, 1.0).is_err());
    }

    #[test]
    fn test_roundtrip_solid_gray() {
        let grid = PixelGrid::solid(4, 4, [128, 128, 128]).unwrap();
        let sig = encode(&grid, 1, 1).unwrap();
        let decoded = decode(&sig, 4, 4, 1.0).unwrap();
        for px in decoded.as_bytes() {
            assert!((*px as i16 - 128).unsigned_abs() <= 1, "got {px}");
        }
    }

    #[test]
    fn test_decode_single_component_is_uniform() {
        let grid = PixelGrid::solid(2, 2, [200, 10, 60]).unwrap();
        let sig = encode(&grid, 1, 1).unwrap();
        let decoded = decode(&sig, 5, 3, 1.0).unwrap();
        let first = decoded.pixel(0, 0).unwrap();
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(decoded.pixel(x, y), Some(first));
            }
        }
    }

    #[test]
    fn test_decode_punch_changes_contrast() {
        let sig = EncodedSignature::parse(KNOWN_HASH).unwrap();
        let normal = decode(&sig, 4, 4, 1.0).unwrap();
        let punched = decode(&sig, 4, 4, 2.0).unwrap();
        assert_ne!(normal, punched);
    }
}

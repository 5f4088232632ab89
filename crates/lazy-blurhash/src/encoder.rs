//! BlurHash encoding: pixel grid -> signature.
//!
//! The encoder projects the grid onto a truncated 2-D cosine basis in linear
//! light and quantizes the resulting coefficients into base83.

use std::f64::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::base83;
use crate::color::{linear_to_srgb, pixel_to_linear, sign_pow};
use crate::error::{BlurHashError, Result};
use crate::sampler::PixelGrid;
use crate::signature::{components_to_size_flag, expected_length, EncodedSignature};

/// Component counts the size character can address.
pub const COMPONENT_RANGE: std::ops::RangeInclusive<u32> = 1..=9;

/// Reject component counts outside `1..=9`.
pub fn check_components(components_x: u32, components_y: u32) -> Result<()> {
    if !COMPONENT_RANGE.contains(&components_x) {
        return Err(BlurHashError::InvalidComponentCount {
            component: "x",
            value: components_x,
        });
    }
    if !COMPONENT_RANGE.contains(&components_y) {
        return Err(BlurHashError::InvalidComponentCount {
            component: "y",
            value: components_y,
        });
    }
    Ok(())
}

/// Encode a pixel grid into a BlurHash.
///
/// The same grid and component counts always give the same signature.
///
/// # Errors
///
/// Returns [`BlurHashError::InvalidComponentCount`] if either component count
/// is outside `1..=9`.
///
/// # Examples
///
/// ```
/// use lazy_blurhash::{encode, PixelGrid};
/// let grid = PixelGrid::solid(2, 2, [255, 0, 0]).unwrap();
/// let sig = encode(&grid, 4, 3).unwrap();
/// assert_eq!(sig.components(), (4, 3));
/// ```
pub fn encode(grid: &PixelGrid, components_x: u32, components_y: u32) -> Result<EncodedSignature> {
    check_components(components_x, components_y)?;

    let factors = basis_factors(grid, components_x, components_y);

    let max_ac_component = factors[1..]
        .iter()
        .flat_map(|c| c.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));

    let dc = &factors[0];
    let dc_value = ((linear_to_srgb(dc[0]) as u64) << 16)
        | ((linear_to_srgb(dc[1]) as u64) << 8)
        | (linear_to_srgb(dc[2]) as u64);

    let quant_max_ac = (max_ac_component * 166.0 - 0.5).floor().clamp(0.0, 82.0) as u64;
    let ac_norm = (quant_max_ac as f64 + 1.0) / 166.0;

    let mut result = String::with_capacity(expected_length(components_x, components_y));
    result.push_str(&base83::encode(components_to_size_flag(components_x, components_y), 1)?);
    result.push_str(&base83::encode(quant_max_ac, 1)?);
    result.push_str(&base83::encode(dc_value, 4)?);
    for component in &factors[1..] {
        result.push_str(&base83::encode(quantize_ac(component, ac_norm), 2)?);
    }

    Ok(EncodedSignature::from_encoded(result))
}

/// Pack one AC coefficient into `0..19^3`.
fn quantize_ac(component: &[f64; 3], norm: f64) -> u64 {
    let quant = |v: f64| {
        (sign_pow(v / norm, 0.5) * 9.0 + 9.5)
            .floor()
            .clamp(0.0, 18.0) as u64
    };
    quant(component[0]) * 19 * 19 + quant(component[1]) * 19 + quant(component[2])
}

/// Project the grid onto each basis function, DC first, in row-major order.
fn basis_factors(grid: &PixelGrid, components_x: u32, components_y: u32) -> Vec<[f64; 3]> {
    let w = grid.width() as usize;
    let h = grid.height() as usize;
    let wf = w as f64;
    let hf = h as f64;

    let cos_x: Vec<Vec<f64>> = (0..components_x as usize)
        .map(|i| (0..w).map(|x| (PI * i as f64 * x as f64 / wf).cos()).collect())
        .collect();
    let cos_y: Vec<Vec<f64>> = (0..components_y as usize)
        .map(|j| (0..h).map(|y| (PI * j as f64 * y as f64 / hf).cos()).collect())
        .collect();

    let linear: Vec<[f64; 3]> = grid
        .as_bytes()
        .chunks_exact(3)
        .map(|px| pixel_to_linear([px[0], px[1], px[2]]))
        .collect();

    let scale = 1.0 / (wf * hf);
    let factor = |index: usize| -> [f64; 3] {
        let i = index % components_x as usize;
        let j = index / components_x as usize;
        let norm = if index == 0 { 1.0 } else { 2.0 };
        let mut sum = [0.0f64; 3];
        for (y, &cy) in cos_y[j].iter().enumerate() {
            let row = &linear[y * w..(y + 1) * w];
            for (px, &cx) in row.iter().zip(&cos_x[i]) {
                let basis = norm * cx * cy;
                sum[0] += basis * px[0];
                sum[1] += basis * px[1];
                sum[2] += basis * px[2];
            }
        }
        [sum[0] * scale, sum[1] * scale, sum[2] * scale]
    };

    let count = (components_x * components_y) as usize;
    #[cfg(feature = "parallel")]
    {
        (0..count).into_par_iter().map(factor).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..count).map(factor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_size_flag() {
        let grid = PixelGrid::solid(4, 4, [0, 0, 0]).unwrap();
        let sig = encode(&grid, 4, 3).unwrap();
        // (4-1) + (3-1)*9 = 21
        assert_eq!(base83::decode(&sig.as_str()[0..1]).unwrap(), 21);
        assert_eq!(sig.as_str().len(), 28);
    }

    #[test]
    fn test_encode_solid_red_single_component() {
        let grid = PixelGrid::solid(2, 2, [255, 0, 0]).unwrap();
        let sig = encode(&grid, 1, 1).unwrap();
        assert_eq!(sig.as_str().len(), 6);
        assert_eq!(sig.components(), (1, 1));
        assert_eq!(sig.average_color(), [255, 0, 0]);
        assert_eq!(sig.ac_values().count(), 0);
    }

    #[test]
    fn test_encode_component_count_validation() {
        let grid = PixelGrid::solid(4, 4, [0, 0, 0]).unwrap();
        assert!(matches!(
            encode(&grid, 0, 3),
            Err(BlurHashError::InvalidComponentCount { component: "x", value: 0 })
        ));
        assert!(encode(&grid, 10, 3).is_err());
        assert!(encode(&grid, 4, 0).is_err());
        assert!(matches!(
            encode(&grid, 4, 10),
            Err(BlurHashError::InvalidComponentCount { component: "y", value: 10 })
        ));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let mut pixels = Vec::with_capacity(8 * 8 * 3);
        for y in 0..8u8 {
            for x in 0..8u8 {
                pixels.extend_from_slice(&[x * 30, y * 30, 128]);
            }
        }
        let grid = PixelGrid::new(8, 8, pixels).unwrap();
        assert_eq!(encode(&grid, 5, 4).unwrap(), encode(&grid, 5, 4).unwrap());
    }

    #[test]
    fn test_encode_gradient_has_ac_energy() {
        let mut pixels = vec![0u8; 8 * 3];
        for x in 0..8 {
            let val = (x * 32).min(255) as u8;
            pixels[x * 3..x * 3 + 3].copy_from_slice(&[val, val, val]);
        }
        let grid = PixelGrid::new(8, 1, pixels).unwrap();
        let sig = encode(&grid, 4, 1).unwrap();
        assert!(sig.quantized_max_ac() > 0);
    }
}

//! Color space conversion between sRGB bytes and linear light.
//!
//! The encoder averages in linear light and the renderer converts back, so
//! both directions go through tables built at compile time.

/// Entries in the linear -> sRGB table. 12 bits of linear input is enough
/// for every byte to come back exactly after a round trip.
const ENCODE_STEPS: usize = 4096;

/// Linear value for every sRGB byte.
static DECODE_TABLE: [f64; 256] = decode_table();

/// sRGB byte for `ENCODE_STEPS` evenly spaced linear values.
static ENCODE_TABLE: [u8; ENCODE_STEPS] = encode_table();

const fn decode_table() -> [f64; 256] {
    let mut table = [0.0f64; 256];
    let mut byte = 0usize;
    while byte < 256 {
        let v = byte as f64 / 255.0;
        table[byte] = if v <= 0.04045 {
            v / 12.92
        } else {
            pow_2_4((v + 0.055) / 1.055)
        };
        byte += 1;
    }
    table
}

const fn encode_table() -> [u8; ENCODE_STEPS] {
    let mut table = [0u8; ENCODE_STEPS];
    let mut step = 0usize;
    while step < ENCODE_STEPS {
        table[step] = to_srgb_byte(step as f64 / (ENCODE_STEPS - 1) as f64);
        step += 1;
    }
    table
}

/// Exact transfer function, rounded to the nearest byte.
const fn to_srgb_byte(linear: f64) -> u8 {
    if linear <= 0.0 {
        return 0;
    }
    if linear >= 1.0 {
        return 255;
    }
    let srgb = if linear <= 0.003_130_8 {
        linear * 12.92
    } else {
        // linear^(1/2.4) == (linear^5)^(1/12)
        let l5 = linear * linear * linear * linear * linear;
        1.055 * root(l5, 12) - 0.055
    };
    (srgb * 255.0 + 0.5) as u8
}

/// `x^2.4` as `x^2 * (x^2)^(1/5)`; `powf` is not available in const fns.
const fn pow_2_4(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let sq = x * x;
    sq * root(sq, 5)
}

/// `value^(1/n)` for `value` in `(0, 1]`, by Newton iteration.
const fn root(value: f64, n: u32) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    if value == 1.0 {
        return 1.0;
    }
    let mut x = if value < 1.0 { 1.0 } else { value };
    let mut iter = 0;
    while iter < 100 {
        let mut x_pow = 1.0;
        let mut k = 1;
        while k < n {
            x_pow *= x;
            k += 1;
        }
        let next = ((n - 1) as f64 * x + value / x_pow) / n as f64;
        let delta = if next > x { next - x } else { x - next };
        if delta < 1e-15 {
            return next;
        }
        x = next;
        iter += 1;
    }
    x
}

/// Linear intensity of one sRGB channel byte.
///
/// ```
/// use lazy_blurhash::color::srgb_to_linear;
/// assert_eq!(srgb_to_linear(0), 0.0);
/// assert!((srgb_to_linear(255) - 1.0).abs() < 1e-10);
/// ```
#[inline]
pub fn srgb_to_linear(value: u8) -> f64 {
    DECODE_TABLE[value as usize]
}

/// sRGB byte for a linear intensity. Input is clamped to `[0, 1]`.
///
/// ```
/// use lazy_blurhash::color::linear_to_srgb;
/// assert_eq!(linear_to_srgb(-3.0), 0);
/// assert_eq!(linear_to_srgb(1.0), 255);
/// ```
#[inline]
pub fn linear_to_srgb(value: f64) -> u8 {
    let step = (value.clamp(0.0, 1.0) * (ENCODE_STEPS - 1) as f64 + 0.5) as usize;
    ENCODE_TABLE[step.min(ENCODE_STEPS - 1)]
}

/// Linearize an RGB pixel.
#[inline]
pub fn pixel_to_linear(rgb: [u8; 3]) -> [f64; 3] {
    rgb.map(srgb_to_linear)
}

/// `|value|^exp` carrying the sign of `value`.
///
/// AC components are compressed and expanded with this so negative
/// coefficients stay negative.
#[inline]
pub fn sign_pow(value: f64, exp: f64) -> f64 {
    value.abs().powf(exp).copysign(value)
}

//! sRGB transfer curve.
//!
//! Values inside `0.0..=1.0` go through the build-time lookup tables with
//! linear interpolation; values outside use the exact IEC 61966-2-1 formula
//! mirrored around zero, so extended-range data survives a round trip.

include!(concat!(env!("OUT_DIR"), "/transfer_lut.rs"));

#[inline]
fn lut_lookup(table: &[f64; 4096], v: f64) -> f64 {
    let scaled = v * 4095.0;
    let index = scaled as usize;

    // Handle edge case: index 4095 (no interpolation possible)
    if index >= 4095 {
        return table[4095];
    }

    let frac = scaled - index as f64;
    let a = table[index];
    let b = table[index + 1];
    a + (b - a) * frac
}

fn srgb_to_linear_exact(v: f64) -> f64 {
    let a = v.abs();
    let out = if a <= 0.04045 {
        a / 12.92
    } else {
        ((a + 0.055) / 1.055).powf(2.4)
    };
    out.copysign(v)
}

fn linear_to_srgb_exact(v: f64) -> f64 {
    let a = v.abs();
    let out = if a <= 0.0031308 {
        a * 12.92
    } else {
        1.055 * a.powf(1.0 / 2.4) - 0.055
    };
    out.copysign(v)
}

/// Decode a gamma-encoded sRGB value to linear light.
#[inline]
pub fn srgb_to_linear(v: f64) -> f64 {
    if v >= 0.0 && v <= 1.0 {
        lut_lookup(&SRGB_TO_LINEAR, v)
    } else {
        srgb_to_linear_exact(v)
    }
}

/// Encode linear light as a gamma-encoded sRGB value.
#[inline]
pub fn linear_to_srgb(v: f64) -> f64 {
    if v >= 0.0 && v <= 1.0 {
        lut_lookup(&LINEAR_TO_SRGB, v)
    } else {
        linear_to_srgb_exact(v)
    }
}

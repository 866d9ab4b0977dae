//! Rec. 709 luminance.

/// Rec. 709 / sRGB primaries luminance weights (R, G, B).
pub const REC709_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Relative luminance of a linear RGB triple.
#[inline]
pub fn luminance(r: f64, g: f64, b: f64) -> f64 {
    r * REC709_WEIGHTS[0] + g * REC709_WEIGHTS[1] + b * REC709_WEIGHTS[2]
}

//! Quantization between integer encodings and `f64`.
//!
//! Integer encodings map their full code range onto a declared [`Range`]:
//! code `0` is `range.min` and the maximum code is `range.max`. Encoding
//! clips to the range before rounding, so out-of-range values saturate.

use crate::RangeError;

/// Closed numeric interval a type's values are declared to occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// The `0.0..=1.0` range used by normalized channels.
    pub const UNIT: Range = Range { min: 0.0, max: 1.0 };

    /// Create a validated range.
    pub fn new(min: f64, max: f64) -> Result<Self, RangeError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(RangeError::NotFinite);
        }
        if min >= max {
            return Err(RangeError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::UNIT
    }
}

#[inline]
fn decode(code: f64, code_max: f64, range: Range) -> f64 {
    range.min + code / code_max * range.span()
}

#[inline]
fn encode(value: f64, code_max: f64, range: Range) -> f64 {
    let unit = (range.clamp(value) - range.min) / range.span();
    (unit * code_max).round()
}

#[inline]
pub fn u8_to_f64(code: u8, range: Range) -> f64 {
    decode(code as f64, u8::MAX as f64, range)
}

#[inline]
pub fn f64_to_u8(value: f64, range: Range) -> u8 {
    // NaN saturates to 0 through the `as` cast
    encode(value, u8::MAX as f64, range) as u8
}

#[inline]
pub fn u16_to_f64(code: u16, range: Range) -> f64 {
    decode(code as f64, u16::MAX as f64, range)
}

#[inline]
pub fn f64_to_u16(value: f64, range: Range) -> u16 {
    encode(value, u16::MAX as f64, range) as u16
}

#[inline]
pub fn u32_to_f64(code: u32, range: Range) -> f64 {
    decode(code as f64, u32::MAX as f64, range)
}

#[inline]
pub fn f64_to_u32(value: f64, range: Range) -> u32 {
    encode(value, u32::MAX as f64, range) as u32
}

/// Widen `f32` to `f64`, clipping only when a range is declared.
#[inline]
pub fn f32_to_f64(value: f32, range: Option<Range>) -> f64 {
    let v = value as f64;
    match range {
        Some(r) => r.clamp(v),
        None => v,
    }
}

/// Narrow `f64` to `f32`, clipping only when a range is declared.
#[inline]
pub fn f64_to_f32(value: f64, range: Option<Range>) -> f32 {
    match range {
        Some(r) => r.clamp(value) as f32,
        None => value as f32,
    }
}

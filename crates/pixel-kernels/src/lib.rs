#![allow(clippy::excessive_precision, clippy::manual_range_contains)]

//! pixel-kernels: scalar building blocks for pixel conversions
//!
//! This crate holds the numeric routines that conversion edges are built
//! from. It knows nothing about registries or formats; every function works
//! on plain scalars or slices so it can be wrapped by whatever calling
//! convention the caller needs.
//!
//! # Modules
//!
//! - [`scalar`]: quantization between integer encodings and `f64` over a
//!   declared [`Range`], with clipping.
//! - [`transfer`]: sRGB transfer curve (IEC 61966-2-1) via build-time
//!   lookup tables, with exact fallback outside `0.0..=1.0`.
//! - [`luma`]: Rec. 709 luminance weights.
//!
//! # Example
//!
//! ```
//! use pixel_kernels::{scalar, Range};
//!
//! let unit = Range::UNIT;
//! let v = scalar::u8_to_f64(255, unit);
//! assert_eq!(v, 1.0);
//! assert_eq!(scalar::f64_to_u8(v, unit), 255);
//! ```

mod error;
pub mod luma;
pub mod scalar;
pub mod transfer;

pub use error::RangeError;
pub use scalar::Range;

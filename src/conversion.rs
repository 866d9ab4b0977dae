//! Conversion callables and the buffer views they operate on.
//!
//! A conversion edge carries one of two calling conventions:
//!
//! - **Linear**: `f(src, dst, n)` over a flat run of `n` interleaved pixels.
//! - **Planar**: `f(&src_planes, &mut dst_planes, n)` where each plane is a
//!   strided view of one component inside a shared byte buffer.
//!
//! Planar views address elements by `(plane, index)` so interleaved and
//! planar memory layouts look the same to the callable.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Declared calling convention of a conversion callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    Linear,
    Planar,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Linear => write!(f, "linear"),
            Convention::Planar => write!(f, "planar"),
        }
    }
}

/// Location of one component's elements inside a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneDesc {
    /// Byte offset of the first element
    pub offset: usize,
    /// Distance in bytes between consecutive elements
    pub stride: usize,
    /// Width in bytes of one element
    pub width: usize,
}

impl PlaneDesc {
    pub fn contiguous(width: usize) -> Self {
        Self {
            offset: 0,
            stride: width,
            width,
        }
    }

    #[inline]
    fn range(&self, index: usize) -> std::ops::Range<usize> {
        let start = self.offset + index * self.stride;
        start..start + self.width
    }
}

fn to_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Read-only strided component views over a source buffer.
pub struct Planes<'a> {
    data: &'a [u8],
    planes: &'a [PlaneDesc],
}

impl<'a> Planes<'a> {
    pub fn new(data: &'a [u8], planes: &'a [PlaneDesc]) -> Self {
        Self { data, planes }
    }

    /// Number of planes (components).
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn desc(&self, plane: usize) -> PlaneDesc {
        self.planes[plane]
    }

    /// Raw bytes of element `index` of `plane`.
    #[inline]
    pub fn element(&self, plane: usize, index: usize) -> &[u8] {
        &self.data[self.planes[plane].range(index)]
    }

    #[inline]
    pub fn read_u8(&self, plane: usize, index: usize) -> u8 {
        self.element(plane, index)[0]
    }

    #[inline]
    pub fn read_u16(&self, plane: usize, index: usize) -> u16 {
        u16::from_ne_bytes(to_array(self.element(plane, index)))
    }

    #[inline]
    pub fn read_u32(&self, plane: usize, index: usize) -> u32 {
        u32::from_ne_bytes(to_array(self.element(plane, index)))
    }

    #[inline]
    pub fn read_f32(&self, plane: usize, index: usize) -> f32 {
        f32::from_ne_bytes(to_array(self.element(plane, index)))
    }

    #[inline]
    pub fn read_f64(&self, plane: usize, index: usize) -> f64 {
        f64::from_ne_bytes(to_array(self.element(plane, index)))
    }
}

/// Writable strided component views over a destination buffer.
pub struct PlanesMut<'a> {
    data: &'a mut [u8],
    planes: &'a [PlaneDesc],
}

impl<'a> PlanesMut<'a> {
    pub fn new(data: &'a mut [u8], planes: &'a [PlaneDesc]) -> Self {
        Self { data, planes }
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn desc(&self, plane: usize) -> PlaneDesc {
        self.planes[plane]
    }

    #[inline]
    pub fn element_mut(&mut self, plane: usize, index: usize) -> &mut [u8] {
        let range = self.planes[plane].range(index);
        &mut self.data[range]
    }

    #[inline]
    pub fn write_u8(&mut self, plane: usize, index: usize, value: u8) {
        self.element_mut(plane, index)[0] = value;
    }

    #[inline]
    pub fn write_u16(&mut self, plane: usize, index: usize, value: u16) {
        self.element_mut(plane, index)
            .copy_from_slice(&value.to_ne_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, plane: usize, index: usize, value: u32) {
        self.element_mut(plane, index)
            .copy_from_slice(&value.to_ne_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, plane: usize, index: usize, value: f32) {
        self.element_mut(plane, index)
            .copy_from_slice(&value.to_ne_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, plane: usize, index: usize, value: f64) {
        self.element_mut(plane, index)
            .copy_from_slice(&value.to_ne_bytes());
    }
}

pub type LinearFn = dyn Fn(&[u8], &mut [u8], usize) + Send + Sync;
pub type PlanarFn = dyn Fn(&Planes<'_>, &mut PlanesMut<'_>, usize) + Send + Sync;

/// Opaque conversion callable tagged with its calling convention.
#[derive(Clone)]
pub enum ConversionFn {
    Linear(Arc<LinearFn>),
    Planar(Arc<PlanarFn>),
}

impl ConversionFn {
    /// Wrap a callable working on flat interleaved pixel runs.
    pub fn linear<F>(f: F) -> Self
    where
        F: Fn(&[u8], &mut [u8], usize) + Send + Sync + 'static,
    {
        ConversionFn::Linear(Arc::new(f))
    }

    /// Wrap a callable working on per-component strided planes.
    pub fn planar<F>(f: F) -> Self
    where
        F: Fn(&Planes<'_>, &mut PlanesMut<'_>, usize) + Send + Sync + 'static,
    {
        ConversionFn::Planar(Arc::new(f))
    }

    pub fn convention(&self) -> Convention {
        match self {
            ConversionFn::Linear(_) => Convention::Linear,
            ConversionFn::Planar(_) => Convention::Planar,
        }
    }
}

impl fmt::Debug for ConversionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConversionFn::{:?}", self.convention())
    }
}

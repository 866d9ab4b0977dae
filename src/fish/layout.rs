use std::ops::Range;

use crate::conversion::PlaneDesc;
use crate::registry::FormatInfo;

/// Byte layout of one pixel representation flowing between stages.
///
/// Planar buffers store each component's plane contiguously, planes back to
/// back in component order, so plane offsets depend on the total pixel count
/// the buffer was laid out for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    planar: bool,
    widths: Vec<usize>,
    bytes_per_pixel: usize,
}

impl Layout {
    pub fn new(planar: bool, widths: Vec<usize>) -> Self {
        let bytes_per_pixel = widths.iter().sum();
        Self {
            planar,
            widths,
            bytes_per_pixel,
        }
    }

    /// Interleaved run of `n` components of `width` bytes each.
    pub fn uniform(width: usize, n: usize) -> Self {
        Self::new(false, vec![width; n])
    }

    pub fn of_format(format: &FormatInfo) -> Self {
        Self::new(format.planar, format.component_widths())
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// Component views for pixels `start..` of a buffer holding `total` pixels.
    pub fn plane_descs(&self, total: usize, start: usize) -> Vec<PlaneDesc> {
        let mut before = 0;
        self.widths
            .iter()
            .map(|&width| {
                let desc = if self.planar {
                    PlaneDesc {
                        offset: total * before + start * width,
                        stride: width,
                        width,
                    }
                } else {
                    PlaneDesc {
                        offset: start * self.bytes_per_pixel + before,
                        stride: self.bytes_per_pixel,
                        width,
                    }
                };
                before += width;
                desc
            })
            .collect()
    }

    /// Flat byte range of pixels `start..start + len`.
    ///
    /// Planar buffers are only flat when the run covers the whole buffer.
    pub fn run_bytes(&self, total: usize, start: usize, len: usize) -> Range<usize> {
        if self.planar {
            debug_assert!(start == 0 && len == total, "planar runs are not flat");
        }
        start * self.bytes_per_pixel..(start + len) * self.bytes_per_pixel
    }
}

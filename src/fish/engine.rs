//! Execution of a resolved fish over caller buffers.

use super::stage::{Region, RegionMut, Stage};
use super::Fish;

impl Fish {
    /// Convert `n` pixels from `source` into `destination`.
    ///
    /// Buffers hold pixels in the layout of the fish's source and destination
    /// formats. Planar buffers are laid out for exactly `n` pixels: plane `k`
    /// starts at `n` times the summed widths of the planes before it.
    ///
    /// Returns the number of pixels converted, always `n`.
    ///
    /// # Panics
    ///
    /// Buffer sizing is the caller's responsibility. A `source` shorter than
    /// `n * source().bytes_per_pixel` or a `destination` shorter than
    /// `n * destination().bytes_per_pixel` is a contract breach and panics;
    /// it is not reported as a recoverable error.
    pub fn process(&self, source: &[u8], destination: &mut [u8], n: usize) -> usize {
        let src_needed = n * self.source.bytes_per_pixel;
        let dst_needed = n * self.destination.bytes_per_pixel;
        assert!(
            source.len() >= src_needed,
            "source buffer holds {} bytes, {} pixels of '{}' need {}",
            source.len(),
            n,
            self.source.name,
            src_needed
        );
        assert!(
            destination.len() >= dst_needed,
            "destination buffer holds {} bytes, {} pixels of '{}' need {}",
            destination.len(),
            n,
            self.destination.name,
            dst_needed
        );

        if n == 0 {
            return 0;
        }

        match self.stages.as_slice() {
            [single] => single.run(
                Region {
                    data: source,
                    total: n,
                    start: 0,
                },
                RegionMut {
                    data: destination,
                    total: n,
                    start: 0,
                },
                n,
            ),
            stages => run_chunked(stages, source, destination, n, self.chunk_size),
        }

        n
    }
}

/// Drive a multi-stage pipeline in chunks through two ping-pong scratch
/// buffers, each sized for `chunk_size` pixels of the widest intermediate
/// representation.
fn run_chunked(
    stages: &[Stage],
    source: &[u8],
    destination: &mut [u8],
    n: usize,
    chunk_size: usize,
) {
    let chunk = chunk_size.max(1).min(n);
    let last = stages.len() - 1;
    let widest = stages[..last]
        .iter()
        .map(Stage::output_bytes_per_pixel)
        .max()
        .unwrap_or(0);

    let mut front = vec![0u8; chunk * widest];
    let mut back = vec![0u8; chunk * widest];

    let mut start = 0;
    while start < n {
        let len = chunk.min(n - start);
        for (i, stage) in stages.iter().enumerate() {
            if i == 0 {
                let out = len * stage.output_bytes_per_pixel();
                stage.run(
                    Region {
                        data: source,
                        total: n,
                        start,
                    },
                    RegionMut {
                        data: &mut front[..out],
                        total: len,
                        start: 0,
                    },
                    len,
                );
            } else if i == last {
                let input = len * stage.input_bytes_per_pixel();
                stage.run(
                    Region {
                        data: &front[..input],
                        total: len,
                        start: 0,
                    },
                    RegionMut {
                        data: &mut *destination,
                        total: n,
                        start,
                    },
                    len,
                );
            } else {
                let input = len * stage.input_bytes_per_pixel();
                let out = len * stage.output_bytes_per_pixel();
                stage.run(
                    Region {
                        data: &front[..input],
                        total: len,
                        start: 0,
                    },
                    RegionMut {
                        data: &mut back[..out],
                        total: len,
                        start: 0,
                    },
                    len,
                );
                std::mem::swap(&mut front, &mut back);
            }
        }
        start += len;
    }
}

//! Executable pipeline stages.

use std::borrow::Cow;
use std::slice;
use std::sync::Arc;

use super::layout::Layout;
use crate::conversion::{ConversionFn, PlaneDesc, Planes, PlanesMut};
use crate::registry::ConversionInfo;

/// Source side of a stage invocation: pixels `start..` of a buffer laid out
/// for `total` pixels.
pub(crate) struct Region<'a> {
    pub data: &'a [u8],
    pub total: usize,
    pub start: usize,
}

pub(crate) struct RegionMut<'a> {
    pub data: &'a mut [u8],
    pub total: usize,
    pub start: usize,
}

/// One type-level edge applied to a single component plane.
#[derive(Debug, Clone)]
pub(crate) struct TypeStep {
    pub edge: Arc<ConversionInfo>,
    pub input_width: usize,
    pub output_width: usize,
}

/// Moves one component between layouts through a chain of type edges.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    /// Component index in the input layout
    pub from: usize,
    /// Component index in the output layout
    pub to: usize,
    pub steps: Vec<TypeStep>,
}

/// Format ↔ model-space adaptation: per-component type conversion plus
/// constant fills for channels the input does not provide.
#[derive(Debug, Clone)]
pub(crate) struct Adapter {
    pub label: &'static str,
    pub input: Layout,
    pub output: Layout,
    pub routes: Vec<Route>,
    pub fills: Vec<(usize, Vec<u8>)>,
}

#[derive(Debug, Clone)]
pub(crate) enum Stage {
    Copy {
        layout: Layout,
    },
    Edge {
        edge: Arc<ConversionInfo>,
        input: Layout,
        output: Layout,
    },
    Adapt(Adapter),
}

impl Stage {
    pub fn input_bytes_per_pixel(&self) -> usize {
        match self {
            Stage::Copy { layout } => layout.bytes_per_pixel(),
            Stage::Edge { input, .. } => input.bytes_per_pixel(),
            Stage::Adapt(a) => a.input.bytes_per_pixel(),
        }
    }

    pub fn output_bytes_per_pixel(&self) -> usize {
        match self {
            Stage::Copy { layout } => layout.bytes_per_pixel(),
            Stage::Edge { output, .. } => output.bytes_per_pixel(),
            Stage::Adapt(a) => a.output.bytes_per_pixel(),
        }
    }

    /// Convert `len` pixels from `src` into `dst`.
    pub fn run(&self, src: Region<'_>, mut dst: RegionMut<'_>, len: usize) {
        match self {
            Stage::Copy { layout } => {
                let s = layout.run_bytes(src.total, src.start, len);
                let d = layout.run_bytes(dst.total, dst.start, len);
                dst.data[d].copy_from_slice(&src.data[s]);
            }
            Stage::Edge {
                edge,
                input,
                output,
            } => match &edge.func {
                ConversionFn::Linear(f) => {
                    let s = input.run_bytes(src.total, src.start, len);
                    let d = output.run_bytes(dst.total, dst.start, len);
                    f(&src.data[s], &mut dst.data[d], len);
                }
                ConversionFn::Planar(f) => {
                    let sd = input.plane_descs(src.total, src.start);
                    let dd = output.plane_descs(dst.total, dst.start);
                    f(
                        &Planes::new(src.data, &sd),
                        &mut PlanesMut::new(dst.data, &dd),
                        len,
                    );
                }
            },
            Stage::Adapt(adapter) => adapter.run(src, dst, len),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Stage::Copy { layout } => {
                format!("copy ({} bytes/pixel)", layout.bytes_per_pixel())
            }
            Stage::Edge { edge, .. } => format!(
                "{} '{}' ({}, cost {})",
                edge.kind,
                edge.name,
                edge.convention(),
                edge.cost
            ),
            Stage::Adapt(adapter) => {
                let steps: Vec<&str> = adapter
                    .routes
                    .iter()
                    .flat_map(|r| r.steps.iter().map(|s| s.edge.name.as_str()))
                    .collect();
                if steps.is_empty() {
                    format!("{} ({} components)", adapter.label, adapter.routes.len())
                } else {
                    format!(
                        "{} ({} components) via {}",
                        adapter.label,
                        adapter.routes.len(),
                        steps.join(", ")
                    )
                }
            }
        }
    }
}

impl Adapter {
    fn run(&self, src: Region<'_>, mut dst: RegionMut<'_>, len: usize) {
        let sd = self.input.plane_descs(src.total, src.start);
        let dd = self.output.plane_descs(dst.total, dst.start);

        if !self.fills.is_empty() {
            let mut out = PlanesMut::new(&mut *dst.data, &dd);
            for (slot, value) in &self.fills {
                for i in 0..len {
                    out.element_mut(*slot, i).copy_from_slice(value);
                }
            }
        }

        for route in &self.routes {
            convert_plane(
                &route.steps,
                src.data,
                sd[route.from],
                &mut *dst.data,
                dd[route.to],
                len,
            );
        }
    }
}

/// Run one component through a chain of type steps.
///
/// Intermediate results live in contiguous buffers sized for `n` elements.
fn convert_plane(
    steps: &[TypeStep],
    src: &[u8],
    src_desc: PlaneDesc,
    dst: &mut [u8],
    dst_desc: PlaneDesc,
    n: usize,
) {
    if steps.is_empty() {
        debug_assert_eq!(src_desc.width, dst_desc.width);
        let w = src_desc.width;
        for i in 0..n {
            let s = src_desc.offset + i * src_desc.stride;
            let d = dst_desc.offset + i * dst_desc.stride;
            dst[d..d + w].copy_from_slice(&src[s..s + w]);
        }
        return;
    }

    let last = steps.len() - 1;
    let mut current: Option<Vec<u8>> = None;
    for (k, step) in steps.iter().enumerate() {
        let (input, input_desc) = match &current {
            Some(buf) => (buf.as_slice(), PlaneDesc::contiguous(step.input_width)),
            None => (src, src_desc),
        };
        if k == last {
            apply_step(step, input, input_desc, dst, dst_desc, n);
        } else {
            let mut next = vec![0u8; n * step.output_width];
            let next_desc = PlaneDesc::contiguous(step.output_width);
            apply_step(step, input, input_desc, &mut next, next_desc, n);
            current = Some(next);
        }
    }
}

fn is_contiguous(desc: &PlaneDesc) -> bool {
    desc.stride == desc.width
}

fn apply_step(
    step: &TypeStep,
    src: &[u8],
    src_desc: PlaneDesc,
    dst: &mut [u8],
    dst_desc: PlaneDesc,
    n: usize,
) {
    match &step.edge.func {
        ConversionFn::Planar(f) => f(
            &Planes::new(src, slice::from_ref(&src_desc)),
            &mut PlanesMut::new(dst, slice::from_ref(&dst_desc)),
            n,
        ),
        ConversionFn::Linear(f) => {
            // Linear type edges see flat element runs
            let input: Cow<'_, [u8]> = if is_contiguous(&src_desc) {
                Cow::Borrowed(&src[src_desc.offset..src_desc.offset + n * src_desc.width])
            } else {
                let planes = Planes::new(src, slice::from_ref(&src_desc));
                Cow::Owned((0..n).flat_map(|i| planes.element(0, i).to_vec()).collect())
            };

            if is_contiguous(&dst_desc) {
                let range = dst_desc.offset..dst_desc.offset + n * dst_desc.width;
                f(&input, &mut dst[range], n);
            } else {
                let mut flat = vec![0u8; n * dst_desc.width];
                f(&input, &mut flat, n);
                let mut out = PlanesMut::new(dst, slice::from_ref(&dst_desc));
                for (i, chunk) in flat.chunks_exact(dst_desc.width).enumerate() {
                    out.element_mut(0, i).copy_from_slice(chunk);
                }
            }
        }
    }
}

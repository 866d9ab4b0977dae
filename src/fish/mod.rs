//! Resolved conversion pipelines ("fishes").
//!
//! A [`Fish`] converts pixels of exactly one source format into one
//! destination format. It is built once by the resolver, cached by the
//! [`Context`](crate::Context), and immutable afterwards: registering new
//! conversions never changes a fish that has already been handed out.

mod cache;
mod engine;
mod layout;
mod resolver;
mod stage;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::registry::{FormatInfo, Id};

pub(crate) use cache::FishCache;
pub(crate) use resolver::{reference_type, resolve};

use layout::Layout;
use stage::Stage;

/// How a fish connects its two formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FishKind {
    /// Source and destination are the same format
    Identity,
    /// A path of format-level conversions
    Direct,
    /// Type paths to the reference type around a model-level path
    Decomposed,
}

impl fmt::Display for FishKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FishKind::Identity => write!(f, "identity"),
            FishKind::Direct => write!(f, "direct"),
            FishKind::Decomposed => write!(f, "decomposed"),
        }
    }
}

#[derive(Debug)]
pub struct Fish {
    source: Arc<FormatInfo>,
    destination: Arc<FormatInfo>,
    kind: FishKind,
    stages: Vec<Stage>,
    cost: f64,
    conversions: Vec<Id>,
    chunk_size: usize,
}

impl Fish {
    pub(crate) fn identity(format: Arc<FormatInfo>, chunk_size: usize) -> Self {
        Self {
            stages: vec![Stage::Copy {
                layout: Layout::of_format(&format),
            }],
            source: format.clone(),
            destination: format,
            kind: FishKind::Identity,
            cost: 0.0,
            conversions: Vec::new(),
            chunk_size,
        }
    }

    pub fn source(&self) -> &FormatInfo {
        &self.source
    }

    pub fn destination(&self) -> &FormatInfo {
        &self.destination
    }

    pub fn kind(&self) -> FishKind {
        self.kind
    }

    /// Accumulated cost of every conversion edge on the path.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Conversion ids in the order they are applied.
    pub fn conversions(&self) -> &[Id] {
        &self.conversions
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }

    /// Human-readable description of each stage.
    pub fn describe(&self) -> Vec<String> {
        self.stages.iter().map(Stage::describe).collect()
    }
}

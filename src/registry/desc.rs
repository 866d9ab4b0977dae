//! Declarative descriptions of entities to register.
//!
//! These are the explicit configuration structs the declaration layer fills
//! in; every optional field has a default and validation happens at
//! registration time in [`Store`](super::Store).

use super::entity::{Encoding, Id, Kind, Sampling};
use crate::conversion::ConversionFn;

#[derive(Debug, Clone)]
pub struct TypeDesc {
    pub name: String,
    pub bits: u32,
    pub min_val: Option<f64>,
    pub max_val: Option<f64>,
    pub encoding: Encoding,
}

impl TypeDesc {
    pub fn new(name: impl Into<String>, bits: u32) -> Self {
        Self {
            name: name.into(),
            bits,
            min_val: None,
            max_val: None,
            encoding: Encoding::Opaque,
        }
    }

    /// Declare the value range conversions clip to.
    pub fn range(mut self, min_val: f64, max_val: f64) -> Self {
        self.min_val = Some(min_val);
        self.max_val = Some(max_val);
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ComponentDesc {
    pub name: String,
    pub alpha: bool,
}

impl ComponentDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alpha: false,
        }
    }

    pub fn alpha(mut self) -> Self {
        self.alpha = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ModelDesc {
    /// Synthesized from the component names when absent
    pub name: Option<String>,
    pub components: Vec<Id>,
}

impl ModelDesc {
    pub fn new(components: &[Id]) -> Self {
        Self {
            name: None,
            components: components.to_vec(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FormatDesc {
    /// Synthesized from model, component and type names when absent
    pub name: Option<String>,
    pub model: Id,
    /// Subset or reordering of the model's components; empty means all
    pub components: Vec<Id>,
    /// One type for every component, or exactly one shared type
    pub types: Vec<Id>,
    pub sampling: Vec<(Id, Sampling)>,
    pub alpha: bool,
    pub planar: bool,
}

impl FormatDesc {
    pub fn new(model: Id, type_id: Id) -> Self {
        Self {
            name: None,
            model,
            components: Vec::new(),
            types: vec![type_id],
            sampling: Vec::new(),
            alpha: false,
            planar: false,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn components(mut self, components: &[Id]) -> Self {
        self.components = components.to_vec();
        self
    }

    /// Per-component types, in the order of [`components`](Self::components).
    pub fn component_types(mut self, types: &[Id]) -> Self {
        self.types = types.to_vec();
        self
    }

    pub fn sampling(mut self, component: Id, sampling: Sampling) -> Self {
        self.sampling.push((component, sampling));
        self
    }

    pub fn alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn planar(mut self, planar: bool) -> Self {
        self.planar = planar;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConversionDesc {
    /// Synthesized as `"<source> to <destination>"` when absent
    pub name: Option<String>,
    pub kind: Kind,
    pub source: Id,
    pub destination: Id,
    pub cost: f64,
    pub func: ConversionFn,
}

impl ConversionDesc {
    /// Default edge cost
    pub const DEFAULT_COST: f64 = 1.0;

    pub fn new(kind: Kind, source: Id, destination: Id, func: ConversionFn) -> Self {
        Self {
            name: None,
            kind,
            source,
            destination,
            cost: Self::DEFAULT_COST,
            func,
        }
    }

    pub fn types(source: Id, destination: Id, func: ConversionFn) -> Self {
        Self::new(Kind::Type, source, destination, func)
    }

    pub fn models(source: Id, destination: Id, func: ConversionFn) -> Self {
        Self::new(Kind::Model, source, destination, func)
    }

    pub fn formats(source: Id, destination: Id, func: ConversionFn) -> Self {
        Self::new(Kind::Format, source, destination, func)
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

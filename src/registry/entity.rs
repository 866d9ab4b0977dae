use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use pixel_kernels::Range;
use serde::Serialize;

use crate::conversion::{ConversionFn, Convention};

/// Stable handle of a registered entity.
///
/// `index` is assigned sequentially per store; `generation` identifies the
/// store instance, so handles from a torn-down store never resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id {
    index: u32,
    generation: u32,
}

impl Id {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Discriminant of the five registrable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Type,
    Component,
    Model,
    Format,
    Conversion,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::Type,
        Kind::Component,
        Kind::Model,
        Kind::Format,
        Kind::Conversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Type => "type",
            Kind::Component => "component",
            Kind::Model => "model",
            Kind::Format => "format",
            Kind::Conversion => "conversion",
        }
    }

    pub(crate) fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    /// Accepts singular or plural kind names, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str() == singular)
            .ok_or_else(|| format!("unknown kind '{s}'"))
    }
}

/// Numeric encoding hint of a [`TypeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Unsigned,
    Signed,
    Float,
    #[default]
    Opaque,
}

/// Scalar representation of one pixel component.
#[derive(Debug)]
pub struct TypeInfo {
    pub id: Id,
    pub name: String,
    pub bits: u32,
    pub min_val: Option<f64>,
    pub max_val: Option<f64>,
    pub encoding: Encoding,
}

impl TypeInfo {
    pub fn bytes(&self) -> usize {
        (self.bits / 8) as usize
    }

    /// Declared value range, when both bounds are set.
    pub fn range(&self) -> Option<Range> {
        match (self.min_val, self.max_val) {
            (Some(min), Some(max)) => Some(Range { min, max }),
            _ => None,
        }
    }

    /// Encoding of `1.0` in this type, when the engine knows how to write it.
    pub(crate) fn one(&self) -> Option<Vec<u8>> {
        match (self.encoding, self.bits) {
            (Encoding::Float, 32) => Some(1.0f32.to_ne_bytes().to_vec()),
            (Encoding::Float, 64) => Some(1.0f64.to_ne_bytes().to_vec()),
            _ => None,
        }
    }
}

/// Named color channel identity.
#[derive(Debug)]
pub struct ComponentInfo {
    pub id: Id,
    pub name: String,
    pub alpha: bool,
}

/// Ordered set of components defining a color space.
#[derive(Debug)]
pub struct ModelInfo {
    pub id: Id,
    pub name: String,
    pub components: Vec<Id>,
    /// Per component: whether it carries alpha
    pub(crate) alpha: Vec<bool>,
}

impl ModelInfo {
    pub fn n_components(&self) -> usize {
        self.components.len()
    }
}

/// Chroma subsampling factors of one format component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sampling {
    pub horizontal: u8,
    pub vertical: u8,
}

impl Sampling {
    pub const FULL: Sampling = Sampling {
        horizontal: 1,
        vertical: 1,
    };

    /// Create a sampling descriptor; factors must be within `1..=4`.
    pub fn new(horizontal: u8, vertical: u8) -> Option<Self> {
        let valid = 1..=4;
        (valid.contains(&horizontal) && valid.contains(&vertical)).then_some(Self {
            horizontal,
            vertical,
        })
    }
}

impl Default for Sampling {
    fn default() -> Self {
        Self::FULL
    }
}

/// One component slot of a [`FormatInfo`].
#[derive(Debug, Clone)]
pub struct FormatComponent {
    /// `None` for anonymous components of `format_n` formats
    pub component: Option<Id>,
    pub type_id: Id,
    pub bytes: usize,
    pub sampling: Sampling,
    /// Index of the matching channel in the model space
    pub(crate) slot: usize,
}

/// Concrete memory layout of a pixel.
#[derive(Debug)]
pub struct FormatInfo {
    pub id: Id,
    pub name: String,
    /// `None` for homogeneous anonymous formats
    pub model: Option<Id>,
    pub components: Vec<FormatComponent>,
    pub alpha: bool,
    pub planar: bool,
    pub bytes_per_pixel: usize,
    /// Number of channels in the model space this format decomposes into
    pub(crate) space_width: usize,
}

impl FormatInfo {
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn component_widths(&self) -> Vec<usize> {
        self.components.iter().map(|c| c.bytes).collect()
    }
}

/// Directed, weighted edge between two entities of the same kind.
#[derive(Debug)]
pub struct ConversionInfo {
    pub id: Id,
    pub name: String,
    /// Kind of both endpoints
    pub kind: Kind,
    pub source: Id,
    pub destination: Id,
    pub cost: f64,
    pub func: ConversionFn,
}

impl ConversionInfo {
    pub fn convention(&self) -> Convention {
        self.func.convention()
    }
}

/// Polymorphic handle over every registrable kind.
#[derive(Debug, Clone)]
pub enum Entity {
    Type(Arc<TypeInfo>),
    Component(Arc<ComponentInfo>),
    Model(Arc<ModelInfo>),
    Format(Arc<FormatInfo>),
    Conversion(Arc<ConversionInfo>),
}

impl Entity {
    pub fn id(&self) -> Id {
        match self {
            Entity::Type(t) => t.id,
            Entity::Component(c) => c.id,
            Entity::Model(m) => m.id,
            Entity::Format(f) => f.id,
            Entity::Conversion(c) => c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Type(t) => &t.name,
            Entity::Component(c) => &c.name,
            Entity::Model(m) => &m.name,
            Entity::Format(f) => &f.name,
            Entity::Conversion(c) => &c.name,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Entity::Type(_) => Kind::Type,
            Entity::Component(_) => Kind::Component,
            Entity::Model(_) => Kind::Model,
            Entity::Format(_) => Kind::Format,
            Entity::Conversion(_) => Kind::Conversion,
        }
    }
}

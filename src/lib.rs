//! pixfish - pixel format conversion engine
//!
//! Pixel encodings are described abstractly (types, components, models and
//! formats) together with the conversions between them. Asking a
//! [`Context`] for a [`Fish`] finds the cheapest chain of conversions from
//! one format to another; the fish then converts pixel buffers in chunks.

pub mod base;
pub mod config;
pub mod context;
pub mod conversion;
pub mod error;
pub mod fish;
pub mod graph;
pub mod registry;

pub use config::EngineConfig;
pub use context::{Context, FormatRef};
pub use conversion::{Convention, ConversionFn, PlaneDesc, Planes, PlanesMut};
pub use error::FishError;
pub use fish::{Fish, FishKind};
pub use registry::{
    ComponentDesc, ConversionDesc, Encoding, Entity, FormatDesc, Id, Kind, ModelDesc, Sampling,
    TypeDesc,
};

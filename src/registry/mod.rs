//! Object store for types, components, models, formats and conversions.
//!
//! Every registered object is an immutable [`Entity`] addressed by a
//! generation-stamped [`Id`]. Names are unique per [`Kind`] and act as a
//! secondary index into the same arena.

mod desc;
mod entity;
mod register;
mod store;

pub use desc::{ComponentDesc, ConversionDesc, FormatDesc, ModelDesc, TypeDesc};
pub use entity::{
    ComponentInfo, ConversionInfo, Encoding, Entity, FormatComponent, FormatInfo, Id, Kind,
    ModelInfo, Sampling, TypeInfo,
};
pub use store::Store;

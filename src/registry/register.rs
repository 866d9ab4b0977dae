//! Validation and name synthesis for each entity kind.

use std::sync::Arc;

use pixel_kernels::Range;

use super::desc::{ComponentDesc, ConversionDesc, FormatDesc, ModelDesc, TypeDesc};
use super::entity::{
    ComponentInfo, ConversionInfo, Entity, FormatComponent, FormatInfo, Id, Kind, ModelInfo,
    Sampling, TypeInfo,
};
use super::store::Store;
use crate::conversion::Convention;
use crate::error::FishError;

fn require_name(kind: Kind, name: &str) -> Result<(), FishError> {
    if name.trim().is_empty() {
        return Err(FishError::invalid(format!("{kind} name must not be empty")));
    }
    Ok(())
}

impl Store {
    pub fn register_type(&mut self, desc: TypeDesc) -> Result<Id, FishError> {
        require_name(Kind::Type, &desc.name)?;
        if desc.bits == 0 || desc.bits % 8 != 0 {
            return Err(FishError::invalid(format!(
                "type '{}': bits must be a positive multiple of 8, got {}",
                desc.name, desc.bits
            )));
        }
        if let (Some(min), Some(max)) = (desc.min_val, desc.max_val) {
            Range::new(min, max)?;
        }

        let info = TypeInfo {
            id: self.next_id(),
            name: desc.name,
            bits: desc.bits,
            min_val: desc.min_val,
            max_val: desc.max_val,
            encoding: desc.encoding,
        };
        tracing::debug!(name = %info.name, bits = info.bits, "Registering type");
        self.insert(Entity::Type(Arc::new(info)))
    }

    pub fn register_component(&mut self, desc: ComponentDesc) -> Result<Id, FishError> {
        require_name(Kind::Component, &desc.name)?;
        let info = ComponentInfo {
            id: self.next_id(),
            name: desc.name,
            alpha: desc.alpha,
        };
        tracing::debug!(name = %info.name, alpha = info.alpha, "Registering component");
        self.insert(Entity::Component(Arc::new(info)))
    }

    pub fn register_model(&mut self, desc: ModelDesc) -> Result<Id, FishError> {
        if desc.components.is_empty() {
            return Err(FishError::invalid("model needs at least one component"));
        }

        let mut components = Vec::with_capacity(desc.components.len());
        for (i, id) in desc.components.iter().enumerate() {
            if desc.components[..i].contains(id) {
                return Err(FishError::invalid(format!(
                    "component {id} listed twice in model"
                )));
            }
            components.push(self.component_info(*id)?.clone());
        }

        let name = match desc.name {
            Some(name) => name,
            None => components.iter().map(|c| c.name.as_str()).collect(),
        };
        require_name(Kind::Model, &name)?;

        let info = ModelInfo {
            id: self.next_id(),
            name,
            components: desc.components,
            alpha: components.iter().map(|c| c.alpha).collect(),
        };
        tracing::debug!(
            name = %info.name,
            components = info.components.len(),
            "Registering model"
        );
        self.insert(Entity::Model(Arc::new(info)))
    }

    pub fn register_format(&mut self, desc: FormatDesc) -> Result<Id, FishError> {
        let model = self.model_info(desc.model)?.clone();
        let order = if desc.components.is_empty() {
            model.components.clone()
        } else {
            desc.components.clone()
        };

        let types = match desc.types.len() {
            1 => vec![desc.types[0]; order.len()],
            n if n == order.len() => desc.types.clone(),
            n => {
                return Err(FishError::invalid(format!(
                    "format over '{}' has {} components but {} types",
                    model.name,
                    order.len(),
                    n
                )))
            }
        };

        let mut components = Vec::with_capacity(order.len());
        let mut names = Vec::with_capacity(order.len());
        let mut alpha = desc.alpha;
        for (i, (component_id, type_id)) in order.iter().zip(&types).enumerate() {
            if order[..i].contains(component_id) {
                return Err(FishError::invalid(format!(
                    "component {component_id} listed twice in format"
                )));
            }
            let component = self.component_info(*component_id)?;
            let slot = model
                .components
                .iter()
                .position(|c| c == component_id)
                .ok_or_else(|| {
                    FishError::invalid(format!(
                        "component '{}' is not part of model '{}'",
                        component.name, model.name
                    ))
                })?;
            let type_info = self.type_info(*type_id)?;

            alpha |= component.alpha;
            names.push((component.name.clone(), type_info.name.clone()));
            components.push(FormatComponent {
                component: Some(*component_id),
                type_id: *type_id,
                bytes: type_info.bytes(),
                sampling: Sampling::FULL,
                slot,
            });
        }

        for (component_id, sampling) in &desc.sampling {
            let target = components
                .iter_mut()
                .find(|c| c.component == Some(*component_id))
                .ok_or_else(|| {
                    FishError::invalid(format!(
                        "sampling given for component {component_id} not in format"
                    ))
                })?;
            target.sampling = *sampling;
        }

        let name = match desc.name {
            Some(name) => name,
            None => synthesize_format_name(&model, &order, &names, desc.planar),
        };
        require_name(Kind::Format, &name)?;

        let info = FormatInfo {
            id: self.next_id(),
            name,
            model: Some(model.id),
            bytes_per_pixel: components.iter().map(|c| c.bytes).sum(),
            components,
            alpha,
            planar: desc.planar,
            space_width: model.n_components(),
        };
        tracing::debug!(
            name = %info.name,
            model = %model.name,
            bytes_per_pixel = info.bytes_per_pixel,
            planar = info.planar,
            "Registering format"
        );
        self.insert(Entity::Format(Arc::new(info)))
    }

    /// Register (or return) the anonymous format of `n` components of one type.
    pub fn register_format_n(&mut self, type_id: Id, n: usize) -> Result<Id, FishError> {
        if n == 0 {
            return Err(FishError::invalid("format_n needs at least one component"));
        }
        let type_info = self.type_info(type_id)?.clone();
        let name = format!("{} x{}", type_info.name, n);

        if let Some(Entity::Format(existing)) = self.lookup_by_name(Kind::Format, &name) {
            if existing.model.is_none() {
                return Ok(existing.id);
            }
        }

        let components = (0..n)
            .map(|slot| FormatComponent {
                component: None,
                type_id,
                bytes: type_info.bytes(),
                sampling: Sampling::FULL,
                slot,
            })
            .collect();
        let info = FormatInfo {
            id: self.next_id(),
            name,
            model: None,
            components,
            alpha: false,
            planar: false,
            bytes_per_pixel: n * type_info.bytes(),
            space_width: n,
        };
        tracing::debug!(name = %info.name, "Registering anonymous format");
        self.insert(Entity::Format(Arc::new(info)))
    }

    pub fn register_conversion(&mut self, desc: ConversionDesc) -> Result<Id, FishError> {
        if !matches!(desc.kind, Kind::Type | Kind::Model | Kind::Format) {
            return Err(FishError::invalid(format!(
                "conversions connect types, models or formats, not {}s",
                desc.kind
            )));
        }
        if !desc.cost.is_finite() || desc.cost < 0.0 {
            return Err(FishError::invalid(format!(
                "conversion cost must be finite and non-negative, got {}",
                desc.cost
            )));
        }
        if desc.source == desc.destination {
            return Err(FishError::invalid(
                "self-conversions are implicit and cannot be registered",
            ));
        }

        let endpoint = |id: Id| -> Result<String, FishError> {
            let entity = self
                .lookup_by_id(id)
                .ok_or_else(|| FishError::not_found(desc.kind, id.to_string()))?;
            if entity.kind() != desc.kind {
                return Err(FishError::invalid(format!(
                    "{} conversion endpoint '{}' is a {}",
                    desc.kind,
                    entity.name(),
                    entity.kind()
                )));
            }
            Ok(entity.name().to_string())
        };
        let source_name = endpoint(desc.source)?;
        let destination_name = endpoint(desc.destination)?;

        if desc.kind == Kind::Format && desc.func.convention() == Convention::Linear {
            let planar = self.format_info(desc.source)?.planar
                || self.format_info(desc.destination)?.planar;
            if planar {
                return Err(FishError::invalid(
                    "linear format conversions require interleaved formats",
                ));
            }
        }

        let name = match desc.name {
            Some(name) => name,
            None => self.unique_conversion_name(&source_name, &destination_name),
        };
        require_name(Kind::Conversion, &name)?;

        let info = ConversionInfo {
            id: self.next_id(),
            name,
            kind: desc.kind,
            source: desc.source,
            destination: desc.destination,
            cost: desc.cost,
            func: desc.func,
        };
        tracing::debug!(
            name = %info.name,
            kind = %info.kind,
            cost = info.cost,
            convention = %info.convention(),
            "Registering conversion"
        );
        self.insert(Entity::Conversion(Arc::new(info)))
    }

    fn unique_conversion_name(&self, source: &str, destination: &str) -> String {
        let base = format!("{source} to {destination}");
        if !self.name_taken(Kind::Conversion, &base) {
            return base;
        }
        let mut k = 2;
        loop {
            let name = format!("{base} #{k}");
            if !self.name_taken(Kind::Conversion, &name) {
                return name;
            }
            k += 1;
        }
    }
}

/// `"<model|components> <type>"`, or one type per component when mixed.
fn synthesize_format_name(
    model: &ModelInfo,
    order: &[Id],
    names: &[(String, String)],
    planar: bool,
) -> String {
    let base = if order == model.components.as_slice() {
        model.name.clone()
    } else {
        names.iter().map(|(c, _)| c.as_str()).collect()
    };

    let first_type = &names[0].1;
    let types = if names.iter().all(|(_, t)| t == first_type) {
        first_type.clone()
    } else {
        names
            .iter()
            .map(|(_, t)| t.as_str())
            .collect::<Vec<_>>()
            .join("-")
    };

    let mut name = format!("{base} {types}");
    if planar {
        name.push_str(" planar");
    }
    name
}

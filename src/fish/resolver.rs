//! Path search from one format to another.
//!
//! A direct path through the format graph always wins when one exists.
//! Otherwise the conversion is decomposed: every source component is taken to
//! the reference type, the pixel travels the model graph as interleaved
//! reference-type values, and is finally packed into the destination layout.

use std::sync::Arc;

use super::layout::Layout;
use super::stage::{Adapter, Route, Stage, TypeStep};
use super::{Fish, FishKind};
use crate::config::EngineConfig;
use crate::error::FishError;
use crate::graph::Path;
use crate::registry::{ConversionInfo, Encoding, Entity, FormatInfo, Id, Kind, Store, TypeInfo};

/// Type every decomposed path passes through.
///
/// The configured reference type wins when it is registered. Otherwise the
/// most precise registered type is used: float encodings before integer ones,
/// then by bit width, earliest registration on ties.
pub(crate) fn reference_type(store: &Store, config: &EngineConfig) -> Option<Arc<TypeInfo>> {
    if let Some(Entity::Type(info)) = store.lookup_by_name(Kind::Type, &config.reference_type) {
        return Some(info.clone());
    }

    let precision = |t: &TypeInfo| (t.encoding == Encoding::Float, t.bits);
    store
        .each(Kind::Type)
        .filter_map(|entity| match entity {
            Entity::Type(info) => Some(info),
            _ => None,
        })
        .fold(None, |best: Option<&Arc<TypeInfo>>, candidate| match best {
            Some(best) if precision(best) >= precision(candidate) => Some(best),
            _ => Some(candidate),
        })
        .cloned()
}

pub(crate) fn resolve(
    store: &Store,
    config: &EngineConfig,
    source: Id,
    destination: Id,
) -> Result<Fish, FishError> {
    let src = store.format_info(source)?.clone();
    let dst = store.format_info(destination)?.clone();

    if src.id == dst.id {
        return Ok(Fish::identity(src, config.chunk_size));
    }

    let fish = match store.graph().shortest_path(Kind::Format, src.id, dst.id) {
        Some(path) => direct(store, config, src, dst, path)?,
        None => decomposed(store, config, src, dst)?,
    };

    tracing::debug!(
        source = %fish.source.name,
        destination = %fish.destination.name,
        kind = %fish.kind,
        cost = fish.cost,
        stages = fish.stages.len(),
        "Resolved fish"
    );
    Ok(fish)
}

fn direct(
    store: &Store,
    config: &EngineConfig,
    src: Arc<FormatInfo>,
    dst: Arc<FormatInfo>,
    path: Path,
) -> Result<Fish, FishError> {
    let stages = path
        .edges
        .iter()
        .map(|edge| {
            Ok(Stage::Edge {
                edge: edge.clone(),
                input: Layout::of_format(store.format_info(edge.source)?),
                output: Layout::of_format(store.format_info(edge.destination)?),
            })
        })
        .collect::<Result<Vec<_>, FishError>>()?;

    Ok(Fish {
        conversions: path.ids().collect(),
        cost: path.cost,
        source: src,
        destination: dst,
        kind: FishKind::Direct,
        stages,
        chunk_size: config.chunk_size,
    })
}

/// Accumulates stages together with the cost and ids of every edge used.
struct Plan {
    stages: Vec<Stage>,
    edges: Vec<Arc<ConversionInfo>>,
}

impl Plan {
    fn cost(&self) -> f64 {
        self.edges.iter().map(|e| e.cost).sum()
    }
}

fn decomposed(
    store: &Store,
    config: &EngineConfig,
    src: Arc<FormatInfo>,
    dst: Arc<FormatInfo>,
) -> Result<Fish, FishError> {
    let no_path = |reason: String| FishError::NoPathFound {
        from: src.name.clone(),
        to: dst.name.clone(),
        reason,
    };

    let reference = reference_type(store, config)
        .ok_or_else(|| no_path("no types registered".to_string()))?;
    let width = reference.bytes();

    let model_path = match (src.model, dst.model) {
        (Some(from), Some(to)) => {
            store
                .graph()
                .shortest_path(Kind::Model, from, to)
                .ok_or_else(|| {
                    no_path(format!(
                        "no model path from '{}' to '{}'",
                        entity_name(store, from),
                        entity_name(store, to)
                    ))
                })?
        }
        (None, None) if src.space_width == dst.space_width => Path::default(),
        (None, None) => {
            return Err(no_path(format!(
                "anonymous formats of {} and {} components",
                src.space_width, dst.space_width
            )))
        }
        _ => {
            return Err(no_path(
                "anonymous formats only convert to anonymous formats".to_string(),
            ))
        }
    };

    let mut plan = Plan {
        stages: Vec::new(),
        edges: Vec::new(),
    };

    // Unpack: format components to model space
    let mut routes = Vec::with_capacity(src.n_components());
    let mut covered = vec![false; src.space_width];
    for (index, component) in src.components.iter().enumerate() {
        let path = type_path(store, component.type_id, reference.id).map_err(no_path)?;
        covered[component.slot] = true;
        routes.push(Route {
            from: index,
            to: component.slot,
            steps: type_steps(store, &path)?,
        });
        plan.edges.extend(path.edges);
    }
    let model_alpha = match src.model {
        Some(model) => store.model_info(model)?.alpha.clone(),
        None => vec![false; src.space_width],
    };
    let fills = covered
        .iter()
        .enumerate()
        .filter(|(_, covered)| !**covered)
        .map(|(slot, _)| {
            let value = match reference.one() {
                Some(one) if model_alpha[slot] => one,
                _ => vec![0u8; width],
            };
            (slot, value)
        })
        .collect();
    plan.stages.push(Stage::Adapt(Adapter {
        label: "unpack",
        input: Layout::of_format(&src),
        output: Layout::uniform(width, src.space_width),
        routes,
        fills,
    }));

    for edge in &model_path.edges {
        let input = store.model_info(edge.source)?.n_components();
        let output = store.model_info(edge.destination)?.n_components();
        plan.stages.push(Stage::Edge {
            edge: edge.clone(),
            input: Layout::uniform(width, input),
            output: Layout::uniform(width, output),
        });
    }
    plan.edges.extend(model_path.edges);

    // Pack: model space to format components
    let mut routes = Vec::with_capacity(dst.n_components());
    for (index, component) in dst.components.iter().enumerate() {
        let path = type_path(store, reference.id, component.type_id).map_err(no_path)?;
        routes.push(Route {
            from: component.slot,
            to: index,
            steps: type_steps(store, &path)?,
        });
        plan.edges.extend(path.edges);
    }
    plan.stages.push(Stage::Adapt(Adapter {
        label: "pack",
        input: Layout::uniform(width, dst.space_width),
        output: Layout::of_format(&dst),
        routes,
        fills: Vec::new(),
    }));

    Ok(Fish {
        cost: plan.cost(),
        conversions: plan.edges.iter().map(|e| e.id).collect(),
        source: src,
        destination: dst,
        kind: FishKind::Decomposed,
        stages: plan.stages,
        chunk_size: config.chunk_size,
    })
}

fn type_path(store: &Store, from: Id, to: Id) -> Result<Path, String> {
    store
        .graph()
        .shortest_path(Kind::Type, from, to)
        .ok_or_else(|| {
            format!(
                "no type path from '{}' to '{}'",
                entity_name(store, from),
                entity_name(store, to)
            )
        })
}

fn type_steps(store: &Store, path: &Path) -> Result<Vec<TypeStep>, FishError> {
    path.edges
        .iter()
        .map(|edge| {
            Ok(TypeStep {
                edge: edge.clone(),
                input_width: store.type_info(edge.source)?.bytes(),
                output_width: store.type_info(edge.destination)?.bytes(),
            })
        })
        .collect()
}

fn entity_name(store: &Store, id: Id) -> String {
    store
        .lookup_by_id(id)
        .map(|entity| entity.name().to_string())
        .unwrap_or_else(|| id.to_string())
}

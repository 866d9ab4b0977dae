use std::collections::HashMap;
use std::sync::Arc;

use super::entity::{ComponentInfo, Entity, FormatInfo, Id, Kind, ModelInfo, TypeInfo};
use crate::error::FishError;
use crate::graph::ConversionGraph;

/// Append-only arena of registered entities with a per-kind name index.
///
/// The store also owns the conversion graph, since every graph edge is a
/// registered [`Conversion`](Kind::Conversion) entity.
#[derive(Debug)]
pub struct Store {
    generation: u32,
    entities: Vec<Entity>,
    names: [HashMap<String, Id>; 5],
    graph: ConversionGraph,
}

impl Store {
    pub fn new(generation: u32) -> Self {
        Self {
            generation,
            entities: Vec::new(),
            names: Default::default(),
            graph: ConversionGraph::default(),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Total number of entities across all kinds.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.names[kind.slot()].len()
    }

    pub fn graph(&self) -> &ConversionGraph {
        &self.graph
    }

    pub(crate) fn next_id(&self) -> Id {
        Id::new(self.entities.len() as u32, self.generation)
    }

    pub(crate) fn name_taken(&self, kind: Kind, name: &str) -> bool {
        self.names[kind.slot()].contains_key(name)
    }

    /// Insert an entity built with [`next_id`](Self::next_id).
    pub(crate) fn insert(&mut self, entity: Entity) -> Result<Id, FishError> {
        let kind = entity.kind();
        let id = entity.id();
        if self.name_taken(kind, entity.name()) {
            return Err(FishError::DuplicateName {
                kind,
                name: entity.name().to_string(),
            });
        }
        debug_assert_eq!(id, self.next_id(), "entity id must come from next_id");

        if let Entity::Conversion(conversion) = &entity {
            self.graph.add(conversion.clone());
        }
        self.names[kind.slot()].insert(entity.name().to_string(), id);
        self.entities.push(entity);
        Ok(id)
    }

    pub fn lookup_by_id(&self, id: Id) -> Option<&Entity> {
        if id.generation() != self.generation {
            return None;
        }
        self.entities.get(id.index() as usize)
    }

    pub fn lookup_by_name(&self, kind: Kind, name: &str) -> Option<&Entity> {
        self.names[kind.slot()]
            .get(name)
            .and_then(|id| self.lookup_by_id(*id))
    }

    /// Entities of one kind in registration order.
    ///
    /// The iterator is lazy and `Clone`, so it can be restarted from any
    /// point by cloning it first.
    pub fn each(&self, kind: Kind) -> impl Iterator<Item = &Entity> + Clone + '_ {
        self.entities.iter().filter(move |e| e.kind() == kind)
    }

    fn wrong_kind(entity: &Entity, expected: Kind) -> FishError {
        FishError::invalid(format!(
            "'{}' is a {}, expected a {}",
            entity.name(),
            entity.kind(),
            expected
        ))
    }

    pub fn type_info(&self, id: Id) -> Result<&Arc<TypeInfo>, FishError> {
        match self.lookup_by_id(id) {
            Some(Entity::Type(t)) => Ok(t),
            Some(other) => Err(Self::wrong_kind(other, Kind::Type)),
            None => Err(FishError::not_found(Kind::Type, id.to_string())),
        }
    }

    pub fn component_info(&self, id: Id) -> Result<&Arc<ComponentInfo>, FishError> {
        match self.lookup_by_id(id) {
            Some(Entity::Component(c)) => Ok(c),
            Some(other) => Err(Self::wrong_kind(other, Kind::Component)),
            None => Err(FishError::not_found(Kind::Component, id.to_string())),
        }
    }

    pub fn model_info(&self, id: Id) -> Result<&Arc<ModelInfo>, FishError> {
        match self.lookup_by_id(id) {
            Some(Entity::Model(m)) => Ok(m),
            Some(other) => Err(Self::wrong_kind(other, Kind::Model)),
            None => Err(FishError::not_found(Kind::Model, id.to_string())),
        }
    }

    pub fn format_info(&self, id: Id) -> Result<&Arc<FormatInfo>, FishError> {
        match self.lookup_by_id(id) {
            Some(Entity::Format(f)) => Ok(f),
            Some(other) => Err(Self::wrong_kind(other, Kind::Format)),
            None => Err(FishError::not_found(Kind::Format, id.to_string())),
        }
    }
}

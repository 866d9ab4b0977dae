//! The engine context: registry, conversion graph and fish cache behind one
//! explicit handle.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::base;
use crate::config::EngineConfig;
use crate::error::FishError;
use crate::fish::{self, Fish, FishCache};
use crate::registry::{
    ComponentDesc, ConversionDesc, Entity, FormatComponent, FormatDesc, FormatInfo, Id, Kind,
    ModelDesc, Sampling, Store, TypeDesc,
};

/// A format given either by id or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatRef {
    Id(Id),
    Name(String),
}

impl From<Id> for FormatRef {
    fn from(id: Id) -> Self {
        FormatRef::Id(id)
    }
}

impl From<&str> for FormatRef {
    fn from(name: &str) -> Self {
        FormatRef::Name(name.to_string())
    }
}

impl From<String> for FormatRef {
    fn from(name: String) -> Self {
        FormatRef::Name(name)
    }
}

impl From<&String> for FormatRef {
    fn from(name: &String) -> Self {
        FormatRef::Name(name.clone())
    }
}

struct State {
    refs: usize,
    /// Bumped on every first init so ids from an earlier lifetime go stale
    generation: u32,
    store: Option<Store>,
}

/// Owns everything registered with the engine.
///
/// `init` and `exit` nest: the registry is created by the first `init` and
/// dropped when the matching last `exit` runs. Fishes handed out earlier stay
/// usable after teardown; everything else reports
/// [`FishError::NotInitialized`].
pub struct Context {
    config: EngineConfig,
    state: RwLock<State>,
    cache: FishCache,
}

impl Context {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: RwLock::new(State {
                refs: 0,
                generation: 0,
                store: None,
            }),
            cache: FishCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_store<R>(&self, f: impl FnOnce(&Store) -> Result<R, FishError>) -> Result<R, FishError> {
        let state = self.read();
        let store = state.store.as_ref().ok_or(FishError::NotInitialized)?;
        f(store)
    }

    fn with_store_mut<R>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<R, FishError>,
    ) -> Result<R, FishError> {
        let mut state = self.write();
        let store = state.store.as_mut().ok_or(FishError::NotInitialized)?;
        f(store)
    }

    /// Registration that can change which path a fish would take.
    pub(crate) fn with_store_invalidating<R>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<R, FishError>,
    ) -> Result<R, FishError> {
        let mut state = self.write();
        let store = state.store.as_mut().ok_or(FishError::NotInitialized)?;
        let result = f(store)?;
        self.cache.clear();
        Ok(result)
    }

    pub fn init(&self) -> Result<(), FishError> {
        let mut state = self.write();
        if state.refs > 0 {
            state.refs += 1;
            return Ok(());
        }

        // The store is published only once fully installed.
        let generation = state.generation.wrapping_add(1);
        let mut store = Store::new(generation);
        if self.config.base_set {
            if let Err(e) = base::install(&mut store, &self.config) {
                tracing::warn!(%e, "Failed to install base set");
                return Err(e);
            }
        }

        state.generation = generation;
        state.store = Some(store);
        state.refs = 1;
        self.cache.clear();
        tracing::info!(generation, "Initialized context");
        Ok(())
    }

    pub fn exit(&self) -> Result<(), FishError> {
        let mut state = self.write();
        if state.refs == 0 {
            return Err(FishError::NotInitialized);
        }
        state.refs -= 1;
        if state.refs == 0 {
            let entities = state.store.as_ref().map(Store::len).unwrap_or(0);
            state.store = None;
            self.cache.clear();
            tracing::info!(entities, "Tore down context");
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.read().store.is_some()
    }

    pub fn register_type(&self, desc: TypeDesc) -> Result<Id, FishError> {
        self.with_store_invalidating(|store| store.register_type(desc))
    }

    pub fn register_component(&self, desc: ComponentDesc) -> Result<Id, FishError> {
        self.with_store_mut(|store| store.register_component(desc))
    }

    pub fn register_model(&self, desc: ModelDesc) -> Result<Id, FishError> {
        self.with_store_invalidating(|store| store.register_model(desc))
    }

    pub fn register_format(&self, desc: FormatDesc) -> Result<Id, FishError> {
        self.with_store_mut(|store| store.register_format(desc))
    }

    /// Anonymous format of `n` components of one type, created on first use.
    pub fn register_format_n(&self, type_id: Id, n: usize) -> Result<Id, FishError> {
        self.with_store_mut(|store| store.register_format_n(type_id, n))
    }

    pub fn register_conversion(&self, desc: ConversionDesc) -> Result<Id, FishError> {
        self.with_store_invalidating(|store| store.register_conversion(desc))
    }

    fn lookup_name(&self, store: &Store, kind: Kind, name: &str) -> Result<Id, FishError> {
        if self.config.warn_on_name_lookups {
            tracing::warn!(%kind, name, "Name lookup");
        }
        store
            .lookup_by_name(kind, name)
            .map(Entity::id)
            .ok_or_else(|| FishError::not_found(kind, name))
    }

    pub fn type_id(&self, name: &str) -> Result<Id, FishError> {
        self.with_store(|store| self.lookup_name(store, Kind::Type, name))
    }

    pub fn component_id(&self, name: &str) -> Result<Id, FishError> {
        self.with_store(|store| self.lookup_name(store, Kind::Component, name))
    }

    pub fn model_id(&self, name: &str) -> Result<Id, FishError> {
        self.with_store(|store| self.lookup_name(store, Kind::Model, name))
    }

    pub fn format_id(&self, name: &str) -> Result<Id, FishError> {
        self.with_store(|store| self.lookup_name(store, Kind::Format, name))
    }

    pub fn conversion_id(&self, name: &str) -> Result<Id, FishError> {
        self.with_store(|store| self.lookup_name(store, Kind::Conversion, name))
    }

    fn format_key(&self, store: &Store, format: FormatRef) -> Result<Id, FishError> {
        match format {
            FormatRef::Id(id) => Ok(store.format_info(id)?.id),
            FormatRef::Name(name) => self.lookup_name(store, Kind::Format, &name),
        }
    }

    pub fn lookup(&self, id: Id) -> Result<Entity, FishError> {
        self.with_store(|store| {
            store
                .lookup_by_id(id)
                .cloned()
                .ok_or_else(|| FishError::invalid(format!("no entity with id {id}")))
        })
    }

    pub fn get_name(&self, id: Id) -> Result<String, FishError> {
        self.lookup(id).map(|entity| entity.name().to_string())
    }

    /// Conversion pipeline from `source` to `destination`, resolved on first
    /// request and cached until the registry changes.
    pub fn fish(
        &self,
        source: impl Into<FormatRef>,
        destination: impl Into<FormatRef>,
    ) -> Result<Arc<Fish>, FishError> {
        let epoch = self.cache.epoch();
        let (source, destination) = (source.into(), destination.into());
        let key = self.with_store(|store| {
            Ok((
                self.format_key(store, source)?,
                self.format_key(store, destination)?,
            ))
        })?;

        if let Some(fish) = self.cache.get(key) {
            tracing::trace!(source = %key.0, destination = %key.1, "Fish cache hit");
            return Ok(fish);
        }

        let resolved = self.with_store(|store| fish::resolve(store, &self.config, key.0, key.1))?;
        Ok(self.cache.insert(epoch, key, Arc::new(resolved)))
    }

    /// Convert `n` pixels with `fish`. See [`Fish::process`].
    pub fn process(&self, fish: &Fish, source: &[u8], destination: &mut [u8], n: usize) -> usize {
        fish.process(source, destination, n)
    }

    pub fn cached_fishes(&self) -> usize {
        self.cache.len()
    }

    /// Name of the type decomposed paths currently go through.
    pub fn reference_type(&self) -> Result<Option<String>, FishError> {
        self.with_store(|store| {
            Ok(fish::reference_type(store, &self.config).map(|info| info.name.clone()))
        })
    }

    fn with_format<R>(
        &self,
        format: impl Into<FormatRef>,
        f: impl FnOnce(&FormatInfo) -> Result<R, FishError>,
    ) -> Result<R, FishError> {
        let format = format.into();
        self.with_store(|store| {
            let id = self.format_key(store, format)?;
            f(store.format_info(id)?)
        })
    }

    pub fn format_has_alpha(&self, format: impl Into<FormatRef>) -> Result<bool, FishError> {
        self.with_format(format, |info| Ok(info.alpha))
    }

    pub fn format_bytes_per_pixel(&self, format: impl Into<FormatRef>) -> Result<usize, FishError> {
        self.with_format(format, |info| Ok(info.bytes_per_pixel))
    }

    pub fn format_n_components(&self, format: impl Into<FormatRef>) -> Result<usize, FishError> {
        self.with_format(format, |info| Ok(info.n_components()))
    }

    pub fn format_is_planar(&self, format: impl Into<FormatRef>) -> Result<bool, FishError> {
        self.with_format(format, |info| Ok(info.planar))
    }

    /// Type of component `index` of `format`.
    pub fn format_component_type(
        &self,
        format: impl Into<FormatRef>,
        index: usize,
    ) -> Result<Id, FishError> {
        self.with_format(format, |info| {
            component_at(info, index).map(|component| component.type_id)
        })
    }

    pub fn format_component_sampling(
        &self,
        format: impl Into<FormatRef>,
        index: usize,
    ) -> Result<Sampling, FishError> {
        self.with_format(format, |info| {
            component_at(info, index).map(|component| component.sampling)
        })
    }

    /// Snapshot of every entity of `kind` in registration order.
    pub fn entities(&self, kind: Kind) -> Result<Vec<Entity>, FishError> {
        self.with_store(|store| Ok(store.each(kind).cloned().collect()))
    }

    /// Visit every entity of `kind` in registration order while holding the
    /// registry read lock. Registering from inside `visit` deadlocks.
    pub fn each(&self, kind: Kind, mut visit: impl FnMut(&Entity)) -> Result<(), FishError> {
        self.with_store(|store| {
            store.each(kind).for_each(&mut visit);
            Ok(())
        })
    }

    pub fn count(&self, kind: Kind) -> Result<usize, FishError> {
        self.with_store(|store| Ok(store.count(kind)))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn component_at(
    info: &FormatInfo,
    index: usize,
) -> Result<&FormatComponent, FishError> {
    info.components.get(index).ok_or_else(|| {
        FishError::invalid(format!(
            "format '{}' has {} components, no index {}",
            info.name,
            info.n_components(),
            index
        ))
    })
}

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::Fish;
use crate::registry::Id;

struct CacheState {
    /// Bumped on every clear; inserts resolved under an older epoch are dropped
    epoch: u64,
    fishes: HashMap<(Id, Id), Arc<Fish>>,
}

/// Process-wide fish cache keyed by (source, destination) format ids.
///
/// Reads take a shared lock only. Concurrent resolvers of the same pair race
/// benignly: the first insert wins and later ones receive the cached fish.
pub(crate) struct FishCache {
    state: RwLock<CacheState>,
}

impl FishCache {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                epoch: 0,
                fishes: HashMap::new(),
            }),
        }
    }

    pub fn get(&self, key: (Id, Id)) -> Option<Arc<Fish>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.fishes.get(&key).cloned()
    }

    pub fn epoch(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .epoch
    }

    /// Store a fish resolved while the cache was at `epoch`.
    ///
    /// Returns the fish callers should use: the cached one if another thread
    /// got there first, or `fish` itself if the cache moved on meanwhile.
    pub fn insert(&self, epoch: u64, key: (Id, Id), fish: Arc<Fish>) -> Arc<Fish> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.epoch != epoch {
            return fish;
        }
        state.fishes.entry(key).or_insert(fish).clone()
    }

    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.epoch += 1;
        state.fishes.clear();
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fishes
            .len()
    }
}

impl Default for FishCache {
    fn default() -> Self {
        Self::new()
    }
}

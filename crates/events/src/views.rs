//! Generation counters for cached read views.
//!
//! Each named view (e.g. `/admin/tracks`) has a monotonically increasing
//! generation. A cache entry records the generation it was built at and is
//! only served while that generation is still current. Writers call
//! [`ViewRegistry::invalidate`] after their transaction commits.

use std::collections::HashMap;
use std::sync::RwLock;

/// Registry of view generations, shared as `Arc<ViewRegistry>`.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    generations: RwLock<HashMap<String, u64>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation of `view`. Views never invalidated are at 0.
    pub fn generation(&self, view: &str) -> u64 {
        let generations = self
            .generations
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        generations.get(view).copied().unwrap_or(0)
    }

    /// Mark the given views stale, returning their new generations in order.
    pub fn invalidate(&self, views: &[&str]) -> Vec<u64> {
        let mut generations = self
            .generations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        views
            .iter()
            .map(|view| {
                let generation = generations.entry((*view).to_string()).or_insert(0);
                *generation += 1;
                *generation
            })
            .collect()
    }
}

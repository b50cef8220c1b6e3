//! Read-through cache keyed by view name and guarded by view generations.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use pixelperfect_events::ViewRegistry;

/// Cached values of one read model, one entry per view name.
///
/// An entry is served only while its recorded generation equals the view's
/// current generation in the [`ViewRegistry`].
#[derive(Debug)]
pub struct ViewCache<T> {
    entries: RwLock<HashMap<String, (u64, T)>>,
}

impl<T: Clone> ViewCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached value for `view` if it was stored at `generation`.
    pub fn get(&self, view: &str, generation: u64) -> Option<T> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries
            .get(view)
            .filter(|(stored, _)| *stored == generation)
            .map(|(_, value)| value.clone())
    }

    pub fn put(&self, view: &str, generation: u64, value: T) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(view.to_string(), (generation, value));
    }

    /// Return the fresh cached value or run `load` and cache its result.
    ///
    /// The generation is read before loading; if the view is invalidated
    /// while `load` runs, the stored entry is already stale and the next read
    /// loads again.
    pub async fn get_or_load<F, Fut, E>(
        &self,
        registry: &ViewRegistry,
        view: &str,
        load: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let generation = registry.generation(view);
        if let Some(value) = self.get(view, generation) {
            tracing::debug!(view, generation, "View cache hit");
            return Ok(value);
        }

        let value = load().await?;
        self.put(view, generation, value.clone());
        tracing::debug!(view, generation, "View cache refilled");
        Ok(value)
    }
}

impl<T: Clone> Default for ViewCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

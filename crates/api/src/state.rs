use std::sync::Arc;

use pixelperfect_db::models::track::TrackSummary;
use pixelperfect_events::{EventBus, ViewRegistry};

use crate::cache::ViewCache;
use crate::config::ServerConfig;
use crate::workflows::TrackWorkflow;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: pixelperfect_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub event_bus: Arc<EventBus>,
    /// Generations of cached read views.
    pub views: Arc<ViewRegistry>,
    /// Admin track listing, keyed by `VIEW_ADMIN_TRACKS`.
    pub track_list_cache: Arc<ViewCache<Vec<TrackSummary>>>,
}

impl AppState {
    pub fn new(
        pool: pixelperfect_db::DbPool,
        config: ServerConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            event_bus,
            views: Arc::new(ViewRegistry::new()),
            track_list_cache: Arc::new(ViewCache::new()),
        }
    }

    /// Track workflow bound to this state's pool, bus, views, and budgets.
    pub fn track_workflow(&self) -> TrackWorkflow<'_> {
        TrackWorkflow::new(
            &self.pool,
            &self.event_bus,
            &self.views,
            self.config.phase_budgets(),
        )
    }
}

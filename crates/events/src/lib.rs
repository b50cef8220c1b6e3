//! PixelPerfect in-process events and read-view invalidation.
//!
//! - [`EventBus`] -- publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope.
//! - [`ViewRegistry`] -- generation counters for cached read views; bumping a
//!   view's generation marks every cached copy of it stale.
//! - [`EventLogger`] -- background subscriber that traces every event.

pub mod bus;
pub mod logger;
pub mod views;

pub use bus::{EventBus, PlatformEvent};
pub use logger::EventLogger;
pub use views::ViewRegistry;

/// Event type names published by the platform.
pub mod event_types {
    pub const TRACK_CREATED: &str = "track.created";
    pub const TRACK_UPDATED: &str = "track.updated";
    pub const TRACK_DELETED: &str = "track.deleted";
    pub const PROGRESS_UPDATED: &str = "progress.updated";
    pub const VIEWS_INVALIDATED: &str = "views.invalidated";
}

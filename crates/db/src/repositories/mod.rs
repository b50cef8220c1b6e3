//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Methods that run inside a caller's transaction take `&mut PgConnection`
//! or a generic executor; the rest take `&PgPool`.

pub mod item_repo;
pub mod module_repo;
pub mod progress_repo;
pub mod track_repo;
pub mod user_repo;

pub use item_repo::RoadmapItemRepo;
pub use module_repo::ModuleRepo;
pub use progress_repo::ProgressRepo;
pub use track_repo::TrackRepo;
pub use user_repo::UserRepo;

//! Roadmap item entity model.

use pixelperfect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `roadmap_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoadmapItem {
    pub id: DbId,
    pub module_id: DbId,
    pub title: String,
    pub link: Option<String>,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

//! Track entity model, tree DTOs, and read models.

use pixelperfect_core::track_tree::ModuleInput;
use pixelperfect_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::module::ModuleWithItems;

/// A row from the `tracks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Track {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a track together with its whole module/item tree.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrack {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modules: Vec<ModuleInput>,
}

/// DTO for replacing a track's title, description, and whole tree.
///
/// When `expected_version` is set, the write is rejected unless the stored
/// version still matches.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceTrackTree {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modules: Vec<ModuleInput>,
    #[serde(default)]
    pub expected_version: Option<i32>,
}

/// A track with its modules and items in display order.
#[derive(Debug, Clone, Serialize)]
pub struct TrackTree {
    #[serde(flatten)]
    pub track: Track,
    pub modules: Vec<ModuleWithItems>,
}

impl TrackTree {
    pub fn item_count(&self) -> usize {
        self.modules.iter().map(|m| m.items.len()).sum()
    }
}

/// Admin listing row: a track with the sizes of its subtree.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrackSummary {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub version: i32,
    pub module_count: i64,
    pub item_count: i64,
    pub progress_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

//! Progress entity model and per-user summaries.

use std::collections::HashMap;

use pixelperfect_core::error::CoreError;
use pixelperfect_core::progress::{completion_percentage, ProgressStatus};
use pixelperfect_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::item::RoadmapItem;
use crate::models::module::Module;
use crate::models::track::{Track, TrackTree};

/// A row from the `progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Progress {
    pub id: DbId,
    pub user_id: DbId,
    pub item_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Progress {
    /// Parse the stored status text.
    pub fn status(&self) -> Result<ProgressStatus, CoreError> {
        self.status.parse()
    }
}

/// DTO for setting a user's status on an item.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProgress {
    pub status: ProgressStatus,
}

/// Raw per-track counts for one user.
#[derive(Debug, Clone, FromRow)]
pub struct TrackProgressCounts {
    pub track_id: DbId,
    pub title: String,
    pub description: String,
    pub total_items: i64,
    pub completed_items: i64,
}

/// A track's completion state for one user.
#[derive(Debug, Clone, Serialize)]
pub struct TrackProgressSummary {
    pub track_id: DbId,
    pub title: String,
    pub description: String,
    pub total_items: i64,
    pub completed_items: i64,
    pub completion_percentage: f64,
}

impl From<TrackProgressCounts> for TrackProgressSummary {
    fn from(counts: TrackProgressCounts) -> Self {
        Self {
            completion_percentage: completion_percentage(
                counts.completed_items,
                counts.total_items,
            ),
            track_id: counts.track_id,
            title: counts.title,
            description: counts.description,
            total_items: counts.total_items,
            completed_items: counts.completed_items,
        }
    }
}

/// A user's overall progress: rows recorded and how many are completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct ProgressOverview {
    pub total_progress: i64,
    pub completed_items: i64,
}

/// A roadmap item with one user's status on it.
#[derive(Debug, Clone, Serialize)]
pub struct ItemProgress {
    #[serde(flatten)]
    pub item: RoadmapItem,
    pub status: ProgressStatus,
}

/// A module whose items carry one user's status.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleProgress {
    #[serde(flatten)]
    pub module: Module,
    pub items: Vec<ItemProgress>,
}

/// One track's full tree as a learner sees it.
#[derive(Debug, Clone, Serialize)]
pub struct TrackProgressDetail {
    #[serde(flatten)]
    pub track: Track,
    pub modules: Vec<ModuleProgress>,
    pub total_items: i64,
    pub completed_items: i64,
    pub completion_percentage: f64,
}

impl TrackProgressDetail {
    /// Attach `progress` rows to the items of `tree`.
    ///
    /// Items without a row are `NOT_STARTED`. Rows for items outside the tree
    /// are ignored.
    pub fn new(tree: TrackTree, progress: &[Progress]) -> Result<Self, CoreError> {
        let mut statuses = HashMap::with_capacity(progress.len());
        for row in progress {
            statuses.insert(row.item_id, row.status()?);
        }

        let mut total_items = 0;
        let mut completed_items = 0;
        let mut modules = Vec::with_capacity(tree.modules.len());
        for entry in tree.modules {
            let mut items = Vec::with_capacity(entry.items.len());
            for item in entry.items {
                let status = statuses
                    .get(&item.id)
                    .copied()
                    .unwrap_or(ProgressStatus::NotStarted);
                total_items += 1;
                if status == ProgressStatus::Completed {
                    completed_items += 1;
                }
                items.push(ItemProgress { item, status });
            }
            modules.push(ModuleProgress {
                module: entry.module,
                items,
            });
        }

        Ok(Self {
            track: tree.track,
            modules,
            total_items,
            completed_items,
            completion_percentage: completion_percentage(completed_items, total_items),
        })
    }
}

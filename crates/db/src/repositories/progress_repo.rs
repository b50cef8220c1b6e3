//! Repository for the `progress` table.

use pixelperfect_core::progress::ProgressStatus;
use pixelperfect_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::{
    Progress, ProgressOverview, TrackProgressCounts, TrackProgressSummary,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, item_id, status, created_at, updated_at";

/// Provides per-user progress queries.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Set a user's status on an item, creating the row on first use.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        item_id: DbId,
        status: ProgressStatus,
    ) -> Result<Progress, sqlx::Error> {
        let query = format!(
            "INSERT INTO progress (user_id, item_id, status) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_progress_user_item \
             DO UPDATE SET status = EXCLUDED.status \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Progress>(&query)
            .bind(user_id)
            .bind(item_id)
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    /// List one user's progress rows for the items of a track.
    pub async fn list_for_user_track(
        pool: &PgPool,
        user_id: DbId,
        track_id: DbId,
    ) -> Result<Vec<Progress>, sqlx::Error> {
        sqlx::query_as::<_, Progress>(
            "SELECT p.id, p.user_id, p.item_id, p.status, p.created_at, p.updated_at \
             FROM progress p \
             JOIN roadmap_items ri ON ri.id = p.item_id \
             JOIN modules m ON m.id = ri.module_id \
             WHERE p.user_id = $1 AND m.track_id = $2 \
             ORDER BY m.position, ri.position",
        )
        .bind(user_id)
        .bind(track_id)
        .fetch_all(pool)
        .await
    }

    /// Count one user's progress rows, and how many of them are completed.
    pub async fn overview_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<ProgressOverview, sqlx::Error> {
        sqlx::query_as::<_, ProgressOverview>(
            "SELECT COUNT(*) AS total_progress, \
                COUNT(*) FILTER (WHERE status = 'COMPLETED') AS completed_items \
             FROM progress \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Count progress rows (any user) attached to a track's items.
    pub async fn count_for_track(pool: &PgPool, track_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM progress p \
             JOIN roadmap_items ri ON ri.id = p.item_id \
             JOIN modules m ON m.id = ri.module_id \
             WHERE m.track_id = $1",
        )
        .bind(track_id)
        .fetch_one(pool)
        .await
    }

    /// Completion summary of every track for one user, newest track first.
    pub async fn summaries_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TrackProgressSummary>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TrackProgressCounts>(
            "SELECT t.id AS track_id, t.title, t.description, \
                COUNT(ri.id) AS total_items, \
                COUNT(p.id) FILTER (WHERE p.status = 'COMPLETED') AS completed_items \
             FROM tracks t \
             LEFT JOIN modules m ON m.track_id = t.id \
             LEFT JOIN roadmap_items ri ON ri.module_id = m.id \
             LEFT JOIN progress p ON p.item_id = ri.id AND p.user_id = $1 \
             GROUP BY t.id \
             ORDER BY t.created_at DESC, t.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(TrackProgressSummary::from).collect())
    }
}

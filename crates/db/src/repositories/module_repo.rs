//! Repository for the `modules` table.

use pixelperfect_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::module::Module;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, track_id, title, position, created_at, updated_at";

/// Provides queries for the modules of a track.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert one module row and return its generated id.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        track_id: DbId,
        title: &str,
        position: i32,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO modules (track_id, title, position) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(track_id)
        .bind(title)
        .bind(position)
        .fetch_one(executor)
        .await
    }

    /// List a track's modules in display order.
    pub async fn list_by_track<'e, E: PgExecutor<'e>>(
        executor: E,
        track_id: DbId,
    ) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules \
             WHERE track_id = $1 \
             ORDER BY position, id"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(track_id)
            .fetch_all(executor)
            .await
    }
}

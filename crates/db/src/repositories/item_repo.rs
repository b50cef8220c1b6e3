//! Repository for the `roadmap_items` table.

use pixelperfect_core::track_tree::{item_batches, ItemInput, ITEM_INSERT_BATCH_SIZE};
use pixelperfect_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::item::RoadmapItem;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, module_id, title, link, position, created_at, updated_at";

/// Provides queries for roadmap items.
pub struct RoadmapItemRepo;

impl RoadmapItemRepo {
    /// Find an item by its internal ID.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<RoadmapItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roadmap_items WHERE id = $1");
        sqlx::query_as::<_, RoadmapItem>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Insert one batch of items for a module using `UNNEST`.
    ///
    /// `first_position` is the position of the first item in the batch.
    /// Returns the number of rows inserted.
    pub async fn insert_batch<'e, E: PgExecutor<'e>>(
        executor: E,
        module_id: DbId,
        first_position: i32,
        items: &[ItemInput],
    ) -> Result<u64, sqlx::Error> {
        if items.is_empty() {
            return Ok(0);
        }

        let titles: Vec<String> = items.iter().map(|i| i.title.clone()).collect();
        let links: Vec<Option<String>> = items.iter().map(|i| i.link.clone()).collect();
        let positions: Vec<i32> = (0..items.len() as i32).map(|i| first_position + i).collect();

        let result = sqlx::query(
            "INSERT INTO roadmap_items (module_id, title, link, position) \
             SELECT $1, t.title, t.link, t.position \
             FROM UNNEST($2::text[], $3::text[], $4::int4[]) AS t(title, link, position)",
        )
        .bind(module_id)
        .bind(&titles)
        .bind(&links)
        .bind(&positions)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Insert all of a module's items, at most [`ITEM_INSERT_BATCH_SIZE`] per statement.
    pub async fn insert_all(
        conn: &mut PgConnection,
        module_id: DbId,
        items: &[ItemInput],
    ) -> Result<u64, sqlx::Error> {
        let mut inserted = 0;
        for (n, batch) in item_batches(items).enumerate() {
            let first_position = (n * ITEM_INSERT_BATCH_SIZE) as i32;
            inserted += Self::insert_batch(&mut *conn, module_id, first_position, batch).await?;
        }
        Ok(inserted)
    }

    /// List all items of a track, grouped by module and in display order.
    pub async fn list_by_track<'e, E: PgExecutor<'e>>(
        executor: E,
        track_id: DbId,
    ) -> Result<Vec<RoadmapItem>, sqlx::Error> {
        sqlx::query_as::<_, RoadmapItem>(
            "SELECT ri.id, ri.module_id, ri.title, ri.link, ri.position, \
                ri.created_at, ri.updated_at \
             FROM roadmap_items ri \
             JOIN modules m ON m.id = ri.module_id \
             WHERE m.track_id = $1 \
             ORDER BY m.position, m.id, ri.position, ri.id",
        )
        .bind(track_id)
        .fetch_all(executor)
        .await
    }

    /// List a module's items in display order.
    pub async fn list_by_module<'e, E: PgExecutor<'e>>(
        executor: E,
        module_id: DbId,
    ) -> Result<Vec<RoadmapItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM roadmap_items \
             WHERE module_id = $1 \
             ORDER BY position, id"
        );
        sqlx::query_as::<_, RoadmapItem>(&query)
            .bind(module_id)
            .fetch_all(executor)
            .await
    }
}

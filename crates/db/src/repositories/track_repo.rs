//! Repository for the `tracks` table and transactional writes of a track's
//! module/item tree.

use std::collections::HashMap;

use pixelperfect_core::track_tree::{ModuleInput, TreeCounts, TreePhase};
use pixelperfect_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::item::RoadmapItem;
use crate::models::module::ModuleWithItems;
use crate::models::track::{CreateTrack, ReplaceTrackTree, Track, TrackSummary, TrackTree};
use crate::repositories::{ModuleRepo, RoadmapItemRepo};
use crate::tree_write::{PhaseBudgets, PhaseClock, TreeWriteError};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, version, created_at, updated_at";

/// Rows removed by the delete phase of a tree write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedRows {
    pub progress: u64,
    pub items: u64,
    pub modules: u64,
}

/// Provides reads and transactional tree writes for tracks.
pub struct TrackRepo;

impl TrackRepo {
    /// Find a track row by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE id = $1");
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a track with its modules and items in display order.
    pub async fn find_tree(pool: &PgPool, id: DbId) -> Result<Option<TrackTree>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE id = $1");
        let track = sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        match track {
            Some(track) => Ok(Some(Self::load_tree(&mut conn, track).await?)),
            None => Ok(None),
        }
    }

    /// List every track with the sizes of its subtree, newest first.
    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<TrackSummary>, sqlx::Error> {
        sqlx::query_as::<_, TrackSummary>(
            "SELECT t.id, t.title, t.description, t.version, \
                (SELECT COUNT(*) FROM modules m WHERE m.track_id = t.id) AS module_count, \
                (SELECT COUNT(*) FROM roadmap_items ri \
                    JOIN modules m ON m.id = ri.module_id \
                    WHERE m.track_id = t.id) AS item_count, \
                (SELECT COUNT(*) FROM progress p \
                    JOIN roadmap_items ri ON ri.id = p.item_id \
                    JOIN modules m ON m.id = ri.module_id \
                    WHERE m.track_id = t.id) AS progress_count, \
                t.created_at, t.updated_at \
             FROM tracks t \
             ORDER BY t.created_at DESC, t.id DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Insert a track together with its whole tree in one transaction.
    pub async fn create_with_tree(
        pool: &PgPool,
        input: &CreateTrack,
        budgets: PhaseBudgets,
    ) -> Result<TrackTree, TreeWriteError> {
        let clock = PhaseClock::start(TreePhase::Recreate, budgets.recreate);
        let mut tx = clock.run(pool.begin()).await?;
        clock
            .run(set_statement_timeout(&mut tx, budgets.recreate))
            .await?;

        let query = format!(
            "INSERT INTO tracks (title, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let track = clock
            .run(
                sqlx::query_as::<_, Track>(&query)
                    .bind(&input.title)
                    .bind(&input.description)
                    .fetch_one(&mut *tx),
            )
            .await?;

        Self::insert_tree(&mut tx, &clock, track.id, &input.modules).await?;
        let tree = clock.run(Self::load_tree(&mut tx, track)).await?;
        clock.run(tx.commit()).await?;

        let counts = TreeCounts::of(&input.modules);
        tracing::info!(
            track_id = tree.track.id,
            modules = counts.modules,
            items = counts.items,
            "Created track tree"
        );
        Ok(tree)
    }

    /// Replace a track's title, description, and entire module/item tree.
    ///
    /// Both phases run in a single transaction, so readers see either the
    /// complete old tree or the complete new one:
    ///
    /// 1. Lock the track row. A missing track fails before anything is
    ///    deleted; a stale `expected_version` fails with a conflict.
    /// 2. Delete phase: progress of the track's items, then the items, then
    ///    the modules.
    /// 3. Recreate phase: update the track (bumping `version`), then insert
    ///    each module followed by its items in batches.
    ///
    /// Each phase is bounded by its own deadline. `statement_timeout` caps
    /// every single statement at the combined budget; it does not bound the
    /// transaction as a whole.
    pub async fn replace_tree(
        pool: &PgPool,
        id: DbId,
        input: &ReplaceTrackTree,
        budgets: PhaseBudgets,
    ) -> Result<TrackTree, TreeWriteError> {
        let delete = PhaseClock::start(TreePhase::Delete, budgets.delete);
        let mut tx = delete.run(pool.begin()).await?;
        delete
            .run(set_statement_timeout(&mut tx, budgets.total()))
            .await?;

        let version = delete
            .run(Self::lock_version(&mut tx, id))
            .await?
            .ok_or(TreeWriteError::TrackNotFound(id))?;

        if let Some(expected) = input.expected_version {
            if expected != version {
                return Err(TreeWriteError::VersionConflict {
                    expected,
                    actual: version,
                });
            }
        }

        let deleted = Self::delete_subtree(&mut tx, &delete, id).await?;
        tracing::debug!(
            track_id = id,
            progress = deleted.progress,
            items = deleted.items,
            modules = deleted.modules,
            "Deleted previous track tree"
        );

        let recreate = PhaseClock::start(TreePhase::Recreate, budgets.recreate);
        let query = format!(
            "UPDATE tracks SET title = $2, description = $3, version = version + 1 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let track = recreate
            .run(
                sqlx::query_as::<_, Track>(&query)
                    .bind(id)
                    .bind(&input.title)
                    .bind(&input.description)
                    .fetch_one(&mut *tx),
            )
            .await?;

        Self::insert_tree(&mut tx, &recreate, id, &input.modules).await?;
        let tree = recreate.run(Self::load_tree(&mut tx, track)).await?;
        recreate.run(tx.commit()).await?;

        let counts = TreeCounts::of(&input.modules);
        tracing::info!(
            track_id = id,
            version = tree.track.version,
            modules = counts.modules,
            items = counts.items,
            "Replaced track tree"
        );
        Ok(tree)
    }

    /// Delete a track and everything beneath it in one transaction.
    ///
    /// Returns `false` if no track with the given `id` exists.
    pub async fn delete_cascade(
        pool: &PgPool,
        id: DbId,
        budget: std::time::Duration,
    ) -> Result<bool, TreeWriteError> {
        let clock = PhaseClock::start(TreePhase::Delete, budget);
        let mut tx = clock.run(pool.begin()).await?;
        clock.run(set_statement_timeout(&mut tx, budget)).await?;

        if clock.run(Self::lock_version(&mut tx, id)).await?.is_none() {
            return Ok(false);
        }

        let deleted = Self::delete_subtree(&mut tx, &clock, id).await?;
        clock
            .run(
                sqlx::query("DELETE FROM tracks WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx),
            )
            .await?;
        clock.run(tx.commit()).await?;

        tracing::info!(
            track_id = id,
            progress = deleted.progress,
            items = deleted.items,
            modules = deleted.modules,
            "Deleted track"
        );
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Lock the track row for the rest of the transaction and return its version.
    async fn lock_version(conn: &mut PgConnection, id: DbId) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>("SELECT version FROM tracks WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Remove progress, items, and modules of a track, dependents first.
    async fn delete_subtree(
        conn: &mut PgConnection,
        clock: &PhaseClock,
        track_id: DbId,
    ) -> Result<DeletedRows, TreeWriteError> {
        let progress = clock
            .run(
                sqlx::query(
                    "DELETE FROM progress WHERE item_id IN ( \
                        SELECT ri.id FROM roadmap_items ri \
                        JOIN modules m ON m.id = ri.module_id \
                        WHERE m.track_id = $1)",
                )
                .bind(track_id)
                .execute(&mut *conn),
            )
            .await?
            .rows_affected();

        let items = clock
            .run(
                sqlx::query(
                    "DELETE FROM roadmap_items WHERE module_id IN ( \
                        SELECT id FROM modules WHERE track_id = $1)",
                )
                .bind(track_id)
                .execute(&mut *conn),
            )
            .await?
            .rows_affected();

        let modules = clock
            .run(
                sqlx::query("DELETE FROM modules WHERE track_id = $1")
                    .bind(track_id)
                    .execute(&mut *conn),
            )
            .await?
            .rows_affected();

        Ok(DeletedRows {
            progress,
            items,
            modules,
        })
    }

    /// Insert modules in order, each followed by its items.
    ///
    /// Items reference their module's generated id, so a module's items are
    /// only written after the module row exists.
    async fn insert_tree(
        conn: &mut PgConnection,
        clock: &PhaseClock,
        track_id: DbId,
        modules: &[ModuleInput],
    ) -> Result<(), TreeWriteError> {
        for (position, module) in modules.iter().enumerate() {
            let module_id = clock
                .run(ModuleRepo::insert(
                    &mut *conn,
                    track_id,
                    &module.title,
                    position as i32,
                ))
                .await?;
            clock
                .run(RoadmapItemRepo::insert_all(&mut *conn, module_id, &module.items))
                .await?;
        }
        Ok(())
    }

    /// Assemble the module/item tree of an already loaded track row.
    async fn load_tree(conn: &mut PgConnection, track: Track) -> Result<TrackTree, sqlx::Error> {
        let modules = ModuleRepo::list_by_track(&mut *conn, track.id).await?;
        let items = RoadmapItemRepo::list_by_track(&mut *conn, track.id).await?;

        let mut by_module: HashMap<DbId, Vec<RoadmapItem>> = HashMap::new();
        for item in items {
            by_module.entry(item.module_id).or_default().push(item);
        }

        let tree = modules
            .into_iter()
            .map(|module| {
                let items = by_module.remove(&module.id).unwrap_or_default();
                ModuleWithItems { module, items }
            })
            .collect();

        Ok(TrackTree {
            track,
            modules: tree,
        })
    }
}

/// Cap the run time of each statement in the current transaction.
async fn set_statement_timeout(
    conn: &mut PgConnection,
    budget: std::time::Duration,
) -> Result<(), sqlx::Error> {
    // SET does not accept bind parameters; the value is an integer we format.
    let query = format!("SET LOCAL statement_timeout = {}", budget.as_millis());
    sqlx::query(&query).execute(conn).await?;
    Ok(())
}

//! Track create, replace-update, and cascade delete.

use pixelperfect_core::error::CoreError;
use pixelperfect_core::roles::Principal;
use pixelperfect_core::track_tree::{
    normalize_tree, validate_module_count, validate_tree, TreeCounts, TreePhase,
};
use pixelperfect_core::types::DbId;
use pixelperfect_core::views::TRACK_WRITE_VIEWS;
use pixelperfect_db::models::track::{CreateTrack, ReplaceTrackTree, TrackTree};
use pixelperfect_db::repositories::TrackRepo;
use pixelperfect_db::{DbPool, PhaseBudgets, TreeWriteError};
use pixelperfect_events::event_types::{TRACK_CREATED, TRACK_DELETED, TRACK_UPDATED};
use pixelperfect_events::{EventBus, PlatformEvent, ViewRegistry};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a track workflow did not complete. Nothing is committed in any case.
#[derive(Debug, thiserror::Error)]
pub enum TrackWorkflowError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Track {id} not found")]
    NotFound { id: DbId },

    #[error("Track was changed by someone else: expected version {expected}, found {actual}")]
    VersionConflict { expected: i32, actual: i32 },

    #[error("update failed: {cause}")]
    TransactionFailed { phase: TreePhase, cause: String },
}

impl From<TreeWriteError> for TrackWorkflowError {
    fn from(err: TreeWriteError) -> Self {
        match err {
            TreeWriteError::TrackNotFound(id) => Self::NotFound { id },
            TreeWriteError::VersionConflict { expected, actual } => {
                Self::VersionConflict { expected, actual }
            }
            TreeWriteError::Timeout { phase, .. } => Self::TransactionFailed {
                phase,
                cause: err.to_string(),
            },
            TreeWriteError::Database { phase, source } => Self::TransactionFailed {
                phase,
                cause: source.to_string(),
            },
        }
    }
}

fn authorize(principal: &Principal) -> Result<(), TrackWorkflowError> {
    principal.require_admin().map_err(|e| match e {
        CoreError::Forbidden(msg) => TrackWorkflowError::Unauthorized(msg),
        other => TrackWorkflowError::Unauthorized(other.to_string()),
    })
}

fn validation(err: CoreError) -> TrackWorkflowError {
    match err {
        CoreError::Validation(msg) => TrackWorkflowError::ValidationFailed(msg),
        other => TrackWorkflowError::ValidationFailed(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Replace-update of an existing track: the id names the target, the tree is
/// the complete new content.
#[derive(Debug, Clone)]
pub struct UpdateTrackRequest {
    pub id: DbId,
    pub tree: ReplaceTrackTree,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Track write operations over borrowed application services.
pub struct TrackWorkflow<'a> {
    pool: &'a DbPool,
    event_bus: &'a EventBus,
    views: &'a ViewRegistry,
    budgets: PhaseBudgets,
}

impl<'a> TrackWorkflow<'a> {
    pub fn new(
        pool: &'a DbPool,
        event_bus: &'a EventBus,
        views: &'a ViewRegistry,
        budgets: PhaseBudgets,
    ) -> Self {
        Self {
            pool,
            event_bus,
            views,
            budgets,
        }
    }

    /// Create a track with its full module/item tree.
    pub async fn create(
        &self,
        principal: &Principal,
        mut input: CreateTrack,
    ) -> Result<TrackTree, TrackWorkflowError> {
        authorize(principal)?;
        validate_tree(&input.title, &input.description, &input.modules).map_err(validation)?;
        input.modules = normalize_tree(input.modules);

        let tree = TrackRepo::create_with_tree(self.pool, &input, self.budgets).await?;

        let counts = TreeCounts::of(&input.modules);
        self.committed(
            PlatformEvent::new(TRACK_CREATED)
                .with_entity("track", tree.track.id)
                .with_actor(principal.user_id)
                .with_payload(serde_json::json!({
                    "modules": counts.modules,
                    "items": counts.items,
                })),
        );
        Ok(tree)
    }

    /// Replace a track's title, description, and entire tree.
    ///
    /// Order matters: the caller is authorized before any data access, the
    /// module count is checked before the rest of the payload, and views are
    /// only invalidated once the single write transaction has committed.
    pub async fn replace(
        &self,
        principal: &Principal,
        request: UpdateTrackRequest,
    ) -> Result<TrackTree, TrackWorkflowError> {
        authorize(principal)?;

        let UpdateTrackRequest { id, mut tree } = request;
        validate_module_count(tree.modules.len()).map_err(validation)?;
        validate_tree(&tree.title, &tree.description, &tree.modules).map_err(validation)?;
        tree.modules = normalize_tree(tree.modules);

        let updated = match TrackRepo::replace_tree(self.pool, id, &tree, self.budgets).await {
            Ok(updated) => updated,
            Err(err) => {
                tracing::warn!(
                    track_id = id,
                    user_id = principal.user_id,
                    phase = err.phase().map(|p| p.as_str()),
                    error = %err,
                    "Track replace rolled back"
                );
                return Err(err.into());
            }
        };

        let counts = TreeCounts::of(&tree.modules);
        self.committed(
            PlatformEvent::new(TRACK_UPDATED)
                .with_entity("track", id)
                .with_actor(principal.user_id)
                .with_payload(serde_json::json!({
                    "modules": counts.modules,
                    "items": counts.items,
                    "version": updated.track.version,
                })),
        );
        Ok(updated)
    }

    /// Delete a track with its modules, items, and all progress on them.
    pub async fn delete(&self, principal: &Principal, id: DbId) -> Result<(), TrackWorkflowError> {
        authorize(principal)?;

        let deleted = TrackRepo::delete_cascade(self.pool, id, self.budgets.delete)
            .await
            .inspect_err(|err| {
                tracing::warn!(track_id = id, error = %err, "Track delete rolled back");
            })?;
        if !deleted {
            return Err(TrackWorkflowError::NotFound { id });
        }

        self.committed(
            PlatformEvent::new(TRACK_DELETED)
                .with_entity("track", id)
                .with_actor(principal.user_id),
        );
        Ok(())
    }

    /// Signal stale views and publish `event`. Call only after commit.
    fn committed(&self, event: PlatformEvent) {
        let generations = self.views.invalidate(TRACK_WRITE_VIEWS);
        tracing::debug!(
            event_type = %event.event_type,
            ?generations,
            "Invalidated track views"
        );
        self.event_bus
            .publish(PlatformEvent::views_invalidated(TRACK_WRITE_VIEWS));
        self.event_bus.publish(event);
    }
}

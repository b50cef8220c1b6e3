//! Handlers for the caller's own learning progress.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use pixelperfect_core::error::CoreError;
use pixelperfect_core::types::DbId;
use pixelperfect_core::views::PROGRESS_WRITE_VIEWS;
use pixelperfect_db::models::progress::{TrackProgressDetail, UpsertProgress};
use pixelperfect_db::repositories::{ProgressRepo, RoadmapItemRepo, TrackRepo};
use pixelperfect_events::event_types::PROGRESS_UPDATED;
use pixelperfect_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/me/tracks
///
/// Every track with the caller's completed/total item counts.
pub async fn list_my_tracks(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summaries = ProgressRepo::summaries_for_user(&state.pool, user.user_id).await?;

    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/me/tracks/{id}
///
/// One track's modules and items, each item with the caller's status, plus
/// the caller's completed/total counts for the track.
pub async fn get_my_track(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(track_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tree = TrackRepo::find_tree(&state.pool, track_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Track",
            id: track_id,
        }))?;
    let progress = ProgressRepo::list_for_user_track(&state.pool, user.user_id, track_id).await?;

    Ok(Json(DataResponse {
        data: TrackProgressDetail::new(tree, &progress)?,
    }))
}

/// GET /api/v1/me/overview
///
/// The caller's recorded progress rows and how many are completed.
pub async fn get_my_overview(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let overview = ProgressRepo::overview_for_user(&state.pool, user.user_id).await?;

    Ok(Json(DataResponse { data: overview }))
}

/// PUT /api/v1/me/progress/{item_id}
///
/// Set the caller's status on one roadmap item.
pub async fn upsert_progress(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(input): Json<UpsertProgress>,
) -> AppResult<impl IntoResponse> {
    RoadmapItemRepo::find_by_id(&state.pool, item_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RoadmapItem",
            id: item_id,
        }))?;

    let progress = ProgressRepo::upsert(&state.pool, user.user_id, item_id, input.status).await?;

    state.views.invalidate(PROGRESS_WRITE_VIEWS);
    state
        .event_bus
        .publish(PlatformEvent::views_invalidated(PROGRESS_WRITE_VIEWS));
    state.event_bus.publish(
        PlatformEvent::new(PROGRESS_UPDATED)
            .with_entity("progress", progress.id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({
                "item_id": item_id,
                "status": input.status,
            })),
    );

    tracing::info!(
        user_id = user.user_id,
        item_id,
        status = %input.status,
        "Progress updated",
    );

    Ok(Json(DataResponse { data: progress }))
}

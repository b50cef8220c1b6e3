//! Handlers for admin track management.
//!
//! Reads go straight to the repository; writes go through
//! [`TrackWorkflow`](crate::workflows::TrackWorkflow), which authorizes the
//! caller itself.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use pixelperfect_core::error::CoreError;
use pixelperfect_core::types::DbId;
use pixelperfect_core::views::VIEW_ADMIN_TRACKS;
use pixelperfect_db::models::track::{CreateTrack, ReplaceTrackTree};
use pixelperfect_db::repositories::TrackRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflows::UpdateTrackRequest;

/// GET /api/v1/tracks
///
/// All tracks with module, item, and progress counts, newest first. Served
/// from the view cache until a track write invalidates it.
pub async fn list_tracks(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let tracks = state
        .track_list_cache
        .get_or_load(&state.views, VIEW_ADMIN_TRACKS, || {
            TrackRepo::list_summaries(&state.pool)
        })
        .await?;

    Ok(Json(DataResponse { data: tracks }))
}

/// POST /api/v1/tracks
pub async fn create_track(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateTrack>,
) -> AppResult<impl IntoResponse> {
    let tree = state
        .track_workflow()
        .create(&user.principal(), input)
        .await?;

    tracing::info!(
        track_id = tree.track.id,
        modules = tree.modules.len(),
        items = tree.item_count(),
        user_id = user.user_id,
        "Track created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: tree })))
}

/// GET /api/v1/tracks/{id}
pub async fn get_track(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(track_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tree = TrackRepo::find_tree(&state.pool, track_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Track",
            id: track_id,
        }))?;

    Ok(Json(DataResponse { data: tree }))
}

/// PUT /api/v1/tracks/{id}
///
/// Replace the track's title, description, and whole module/item tree.
/// Progress on the replaced items is discarded.
pub async fn update_track(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(track_id): Path<DbId>,
    Json(tree): Json<ReplaceTrackTree>,
) -> AppResult<impl IntoResponse> {
    let request = UpdateTrackRequest { id: track_id, tree };
    let updated = state
        .track_workflow()
        .replace(&user.principal(), request)
        .await?;

    tracing::info!(
        track_id,
        version = updated.track.version,
        modules = updated.modules.len(),
        items = updated.item_count(),
        user_id = user.user_id,
        "Track replaced",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/tracks/{id}
pub async fn delete_track(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(track_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state
        .track_workflow()
        .delete(&user.principal(), track_id)
        .await?;

    tracing::info!(track_id, user_id = user.user_id, "Track deleted");

    Ok(StatusCode::NO_CONTENT)
}

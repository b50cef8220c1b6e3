//! Routes for the caller's own progress, mounted at `/me`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// ```text
/// GET /overview             -> get_my_overview
/// GET /tracks               -> list_my_tracks
/// GET /tracks/{id}          -> get_my_track
/// PUT /progress/{item_id}   -> upsert_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(progress::get_my_overview))
        .route("/tracks", get(progress::list_my_tracks))
        .route("/tracks/{id}", get(progress::get_my_track))
        .route("/progress/{item_id}", put(progress::upsert_progress))
}

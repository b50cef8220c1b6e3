//! Routes for admin track management, mounted at `/tracks`.

use axum::routing::get;
use axum::Router;

use crate::handlers::track;
use crate::state::AppState;

/// ```text
/// GET    /       -> list_tracks
/// POST   /       -> create_track
/// GET    /{id}   -> get_track
/// PUT    /{id}   -> update_track
/// DELETE /{id}   -> delete_track
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(track::list_tracks).post(track::create_track))
        .route(
            "/{id}",
            get(track::get_track)
                .put(track::update_track)
                .delete(track::delete_track),
        )
}

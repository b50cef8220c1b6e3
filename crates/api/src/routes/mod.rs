pub mod health;
pub mod progress;
pub mod track;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /tracks                       list (admin), create
/// /tracks/{id}                  get (admin), replace, delete
///
/// /me/overview                  caller's completed/recorded progress counts
/// /me/tracks                    caller's completion per track
/// /me/tracks/{id}               one track with the caller's item statuses
/// /me/progress/{item_id}        set caller's status on an item
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tracks", track::router())
        .nest("/me", progress::router())
}

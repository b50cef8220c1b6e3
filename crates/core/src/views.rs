//! Names of cached read views.
//!
//! A write that changes what a view shows must invalidate that view after it
//! commits so the next read refetches.

pub const VIEW_DASHBOARD: &str = "/dashboard";
pub const VIEW_DASHBOARD_TRACKS: &str = "/dashboard/tracks";
pub const VIEW_DASHBOARD_TRACK: &str = "/dashboard/track";
pub const VIEW_ADMIN_TRACKS: &str = "/admin/tracks";

/// Views affected by creating, replacing, or deleting a track.
pub const TRACK_WRITE_VIEWS: &[&str] = &[VIEW_DASHBOARD_TRACKS, VIEW_ADMIN_TRACKS];

/// Views affected by a user changing their progress on an item.
pub const PROGRESS_WRITE_VIEWS: &[&str] =
    &[VIEW_DASHBOARD, VIEW_DASHBOARD_TRACKS, VIEW_DASHBOARD_TRACK];

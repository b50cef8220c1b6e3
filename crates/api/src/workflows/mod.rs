//! Multi-step write operations that sit between handlers and repositories.
//!
//! A workflow takes the acting [`Principal`](pixelperfect_core::roles::Principal)
//! explicitly, authorizes it before touching data, and only signals views and
//! events after its transaction has committed.

pub mod track;

pub use track::{TrackWorkflow, TrackWorkflowError, UpdateTrackRequest};

//! PixelPerfect domain types and rules.
//!
//! Everything in this crate is pure: no database, no network. The db and api
//! crates build on these types and validation functions.

pub mod error;
pub mod progress;
pub mod roles;
pub mod track_tree;
pub mod types;
pub mod views;

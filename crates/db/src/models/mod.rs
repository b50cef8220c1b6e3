//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for writes
//! - Read models that assemble several rows for a single response

pub mod item;
pub mod module;
pub mod progress;
pub mod track;
pub mod user;

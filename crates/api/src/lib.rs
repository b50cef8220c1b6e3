//! PixelPerfect API server library.
//!
//! Exposes config, state, error handling, workflows, and routes so the
//! binary entrypoint and the integration tests build the same application.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod workflows;

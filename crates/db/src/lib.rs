//! PostgreSQL access for PixelPerfect.
//!
//! - [`models`] -- row structs and DTOs.
//! - [`repositories`] -- zero-sized repository types with async query methods.
//! - [`tree_write`] -- phase budgets and errors for transactional tree writes.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod tree_write;

pub use tree_write::{PhaseBudgets, TreeWriteError};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

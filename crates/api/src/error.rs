use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pixelperfect_core::error::CoreError;
use serde_json::json;

use crate::workflows::TrackWorkflowError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Renders as `{ "error": .., "code": .. }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<TrackWorkflowError> for AppError {
    fn from(err: TrackWorkflowError) -> Self {
        match err {
            TrackWorkflowError::Unauthorized(msg) => AppError::Core(CoreError::Forbidden(msg)),
            TrackWorkflowError::ValidationFailed(msg) => {
                AppError::Core(CoreError::Validation(msg))
            }
            TrackWorkflowError::NotFound { id } => {
                AppError::Core(CoreError::NotFound { entity: "Track", id })
            }
            conflict @ TrackWorkflowError::VersionConflict { .. } => {
                AppError::Core(CoreError::Conflict(conflict.to_string()))
            }
            failed @ TrackWorkflowError::TransactionFailed { phase, .. } => {
                AppError::InternalError(format!("{phase} phase: {failed}"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => internal(msg),
            },
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log the real cause and hand the client a sanitized message.
fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on a `uq_*` constraint map to 409.
/// - Foreign key violations map to 404: the row being written points at a
///   user or item that does not exist (or was deleted concurrently).
/// - Everything else is a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            match db_err.constraint() {
                Some(constraint) if constraint.starts_with("uq_") => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                ),
                _ => internal(&db_err.to_string()),
            }
        }
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
            tracing::debug!(
                constraint = db_err.constraint().unwrap_or("unknown"),
                "Foreign key violation"
            );
            (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Referenced resource not found".to_string(),
            )
        }
        other => internal(&other.to_string()),
    }
}

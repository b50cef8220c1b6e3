//! `AppError` to HTTP response mapping, called directly through
//! `IntoResponse` without a server.

use std::time::Duration;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use pixelperfect_api::error::AppError;
use pixelperfect_api::workflows::TrackWorkflowError;
use pixelperfect_core::error::CoreError;
use pixelperfect_core::track_tree::TreePhase;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_returns_404() {
    let (status, json) = render(AppError::Core(CoreError::NotFound {
        entity: "Track",
        id: 42,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Track with id 42 not found");
}

#[tokio::test]
async fn unauthorized_returns_401_and_forbidden_403() {
    let (status, json) = render(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) = render(AppError::Core(CoreError::Forbidden("nope".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let (status, json) =
        render(AppError::InternalError("password=hunter2 leaked".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
    assert!(!json.to_string().contains("hunter2"));
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Track workflow errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn workflow_unauthorized_is_403() {
    let err = AppError::from(TrackWorkflowError::Unauthorized("Admin role required".into()));
    assert_matches!(&err, AppError::Core(CoreError::Forbidden(_)));

    let (status, json) = render(err).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "Admin role required");
}

#[tokio::test]
async fn workflow_validation_is_400() {
    let (status, json) = render(AppError::from(TrackWorkflowError::ValidationFailed(
        "A track may have at most 500 modules, got 501".into(),
    )))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn workflow_not_found_and_conflict() {
    let (status, json) = render(AppError::from(TrackWorkflowError::NotFound { id: 9 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Track with id 9 not found");

    let (status, json) = render(AppError::from(TrackWorkflowError::VersionConflict {
        expected: 1,
        actual: 2,
    }))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn transaction_failure_is_500_without_cause() {
    let err = TrackWorkflowError::TransactionFailed {
        phase: TreePhase::Recreate,
        cause: "new row violates check constraint \"modules_title_check\"".into(),
    };
    assert_eq!(
        err.to_string(),
        "update failed: new row violates check constraint \"modules_title_check\""
    );

    let app_err = AppError::from(err);
    assert_matches!(&app_err, AppError::InternalError(msg) if msg.starts_with("recreate phase:"));

    let (status, json) = render(app_err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
    assert!(!json.to_string().contains("modules_title_check"));
}

#[test]
fn timeout_budget_appears_in_cause() {
    let err = TrackWorkflowError::from(pixelperfect_db::TreeWriteError::Timeout {
        phase: TreePhase::Delete,
        budget: Duration::from_secs(15),
    });
    assert_matches!(
        err,
        TrackWorkflowError::TransactionFailed { phase: TreePhase::Delete, ref cause }
            if cause == "delete phase exceeded its 15000ms budget"
    );
}

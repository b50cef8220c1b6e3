#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use pixelperfect_api::auth::jwt::{generate_access_token, JwtConfig};
use pixelperfect_api::config::ServerConfig;
use pixelperfect_api::router::build_app_router;
use pixelperfect_api::state::AppState;
use pixelperfect_core::roles::{ROLE_ADMIN, ROLE_USER};
use pixelperfect_core::types::DbId;
use pixelperfect_db::models::user::CreateUser;
use pixelperfect_db::repositories::UserRepo;
use pixelperfect_events::EventBus;

const TEST_SECRET: &str = "pixelperfect-test-secret";

/// Server config with development defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 60,
        shutdown_timeout_secs: 1,
        track_delete_timeout_secs: 15,
        track_recreate_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, test_config(), Arc::new(EventBus::default()))
}

/// Full application router over `pool`, with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(test_state(pool))
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

/// Insert a user row and return `(id, bearer token)`.
pub async fn create_user(pool: &PgPool, role: &str) -> (DbId, String) {
    let external_id = uuid::Uuid::new_v4().to_string();
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{external_id}@example.com"),
            external_id,
            name: None,
            role: Some(role.to_string()),
        },
    )
    .await
    .unwrap();
    (user.id, token_for(user.id, role))
}

pub async fn admin(pool: &PgPool) -> (DbId, String) {
    create_user(pool, ROLE_ADMIN).await
}

pub async fn learner(pool: &PgPool) -> (DbId, String) {
    create_user(pool, ROLE_USER).await
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Tree payload with `modules` modules of `items` items each.
pub fn tree_payload(title: &str, modules: usize, items: usize) -> serde_json::Value {
    let modules: Vec<_> = (0..modules)
        .map(|m| {
            serde_json::json!({
                "title": format!("{title} module {m}"),
                "items": (0..items)
                    .map(|i| serde_json::json!({
                        "title": format!("{title} item {m}.{i}"),
                        "link": format!("https://example.com/{m}/{i}"),
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::json!({
        "title": title,
        "description": format!("{title} description"),
        "modules": modules,
    })
}

/// Create a track through the API and return its JSON tree.
pub async fn create_track(
    pool: &PgPool,
    token: &str,
    payload: serde_json::Value,
) -> serde_json::Value {
    let response = post_json(build_test_app(pool.clone()), "/api/v1/tracks", token, payload).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#![allow(dead_code)]

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use agora_db::DbPool;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use agora_api::config::ServerConfig;
use agora_api::router::build_app_router;
use agora_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        database_dir: PathBuf::from("database"),
        sqlite_file_name: "test.db".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Fresh in-memory store with the schema applied.
pub async fn test_pool() -> DbPool {
    let pool = agora_db::connect_in_memory().await.unwrap();
    agora_db::initialize_schema(&pool).await.unwrap();
    pool
}

/// Build the full application router over `pool`, with the same middleware
/// stack production uses.
pub fn build_test_app(pool: DbPool) -> Router {
    build_test_app_with_config(pool, test_config())
}

pub fn build_test_app_with_config(pool: DbPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Body::from(json.to_string())).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Body::from(json.to_string())).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A valid create/edit body; override fields with `json["field"] = ...`.
pub fn user_body(email: &str, username: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "username": username,
        "firstName": "Ada",
        "lastName": "Lovelace",
    })
}

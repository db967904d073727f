//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, test_pool};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app(test_pool().await);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[tokio::test]
async fn health_check_reports_closed_database() {
    let pool = test_pool().await;
    pool.close().await;

    let response = get(common::build_test_app(pool), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(test_pool().await);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["_tag"], "failure");
    assert_eq!(json["error"], "Not Found");
}

#[tokio::test]
async fn unsupported_method_returns_405_envelope() {
    let app = common::build_test_app(test_pool().await);
    let response = common::send(app, Method::DELETE, "/users", Body::empty()).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let json = body_json(response).await;
    assert_eq!(json["_tag"], "failure");
    assert_eq!(json["error"], "Method Not Allowed");
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(test_pool().await);
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let app = common::build_test_app(test_pool().await);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/users")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:5173"
    );
}

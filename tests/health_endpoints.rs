//! Health, info, readiness, OpenAPI and routing behaviour

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_health_check_payload_is_exact() {
    let client = TestClient::new();

    let (status, body) = client.get("/api/health/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "message": "Backend API is running"})
    );
}

#[tokio::test]
async fn test_health_check_ignores_query_and_auth() {
    let client = TestClient::new();

    let (status, body) = client
        .get("/api/health/?verbose=1", Some("not-a-token"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_api_info_payload_is_exact() {
    let client = TestClient::new();

    let (status, body) = client.get("/api/info/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "name": "Rempo API",
            "version": "1.0.0",
            "description": "Django REST API for Rempo application"
        })
    );
}

#[tokio::test]
async fn test_health_and_info_reject_other_methods() {
    let client = TestClient::new();

    for uri in ["/api/health/", "/api/info/"] {
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let (status, _) = client.request(method.clone(), uri, Some(json!({})), None).await;
            assert_eq!(
                status,
                StatusCode::METHOD_NOT_ALLOWED,
                "{} {} should be rejected",
                method,
                uri
            );
        }
    }
}

#[tokio::test]
async fn test_ready_check() {
    let client = TestClient::new();
    client.register(&TestUser::new("ready")).await;

    let (status, body) = client.get("/api/ready/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["users"], 1);
    assert_eq!(body["blacklist"]["entries"], 0);
    assert_eq!(body["blacklist"]["lookups"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_json_not_found() {
    let client = TestClient::new();

    let (status, body) = client.get("/api/does-not-exist/", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_auth_routes_resolve() {
    let client = TestClient::new();

    // Wrong method still matches the path: 405, never 404
    for uri in [
        "/api/auth/register/",
        "/api/auth/login/",
        "/api/auth/token/refresh/",
    ] {
        let (status, _) = client.get(uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "GET {}", uri);
    }

    // Protected paths may answer 401 before the method check
    let (status, _) = client.get("/api/auth/logout/", None).await;
    assert_ne!(status, StatusCode::NOT_FOUND);
    let (status, _) = client.post("/api/auth/user/", json!({}), None).await;
    assert_ne!(status, StatusCode::NOT_FOUND);

    // Correct method reaches the handler or its guard
    let (status, _) = client.get("/api/auth/user/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = client.post("/api/auth/logout/", json!({}), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = client.post("/api/auth/token/refresh/", json!({}), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = client.post("/api/auth/login/", json!({}), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = client.post("/api/auth/register/", json!({}), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_openapi_document() {
    let client = TestClient::new();

    let (status, body) = client.get("/api/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Rempo API");
    assert!(body["paths"]["/api/auth/token/refresh/"].is_object());
    assert!(body["components"]["securitySchemes"]["Bearer"].is_object());
}

#[tokio::test]
async fn test_cors_preflight_for_configured_origin() {
    let client = TestClient::new();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/auth/login/")
        .header(header::ORIGIN, "http://localhost:4200")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(client.app.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:4200"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let client = TestClient::new();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/health/")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(client.app.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

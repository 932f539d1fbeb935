#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use rempo_api::{
    blacklist::MemoryBlacklist, config::Config, create_router, database::MemoryDatabase,
    AppState,
};

/// Config tuned for tests: cheap bcrypt, fixed secret
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.password.bcrypt_rounds = 4;
    config.auth.jwt.secret = "integration-test-secret-at-least-32-chars".to_string();
    config
}

pub fn test_state(config: Config) -> AppState {
    AppState::new(
        config,
        Arc::new(MemoryDatabase::new()),
        Arc::new(MemoryBlacklist::new()),
    )
    .expect("test config builds a valid state")
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub fn new(prefix: &str) -> Self {
        let unique_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        Self {
            username: format!("{}_{}", prefix, unique_id),
            email: format!("{}+{}@example.com", prefix, unique_id),
            password: "Hv4ZkR9_Wp2Yn3_".to_string(),
        }
    }

    pub fn registration_payload(&self) -> Value {
        json!({
            "username": self.username,
            "email": self.email,
            "password": self.password,
            "first_name": "Test",
            "last_name": "User"
        })
    }

    pub fn login_payload(&self) -> Value {
        json!({
            "username": self.username,
            "password": self.password
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

impl AuthTokens {
    pub fn from_response(response: &Value) -> Option<Self> {
        let tokens = response.get("tokens")?;
        Some(Self {
            access: tokens.get("access")?.as_str()?.to_string(),
            refresh: tokens.get("refresh")?.as_str()?.to_string(),
        })
    }
}

/// Drives the router in-process
#[derive(Clone)]
pub struct TestClient {
    pub app: Router,
    pub state: AppState,
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_state(test_state(config))
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            app: create_router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), token).await
    }

    /// Register a user and return its tokens, panicking on failure
    pub async fn register(&self, user: &TestUser) -> (AuthTokens, Value) {
        let (status, body) = self
            .post("/api/auth/register/", user.registration_payload(), None)
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        let tokens = AuthTokens::from_response(&body).expect("tokens in registration response");
        (tokens, body)
    }

    /// Log a user in and return its tokens, panicking on failure
    pub async fn login(&self, user: &TestUser) -> (AuthTokens, Value) {
        let (status, body) = self
            .post("/api/auth/login/", user.login_payload(), None)
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        let tokens = AuthTokens::from_response(&body).expect("tokens in login response");
        (tokens, body)
    }
}

/// Assert the standard error body shape and return its code
pub fn error_code(body: &Value) -> &str {
    assert!(
        body["timestamp"].is_string(),
        "error body missing timestamp: {}",
        body
    );
    body["error"]["code"]
        .as_str()
        .unwrap_or_else(|| panic!("error body missing code: {}", body))
}

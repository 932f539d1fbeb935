use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;
use utoipa::ToSchema;

use crate::{errors::AppError, AppState};

pub const API_NAME: &str = "Rempo API";
pub const API_VERSION: &str = "1.0.0";
pub const API_DESCRIPTION: &str = "Django REST API for Rempo application";

pub const HEALTH_STATUS: &str = "healthy";
pub const HEALTH_MESSAGE: &str = "Backend API is running";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ApiInfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Simple health check to verify the API is running
#[utoipa::path(
    get,
    path = "/api/health/",
    tag = "health",
    responses((status = 200, description = "API is running", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS.to_string(),
        message: HEALTH_MESSAGE.to_string(),
    })
}

/// API information
#[utoipa::path(
    get,
    path = "/api/info/",
    tag = "health",
    responses((status = 200, description = "API name, version and description", body = ApiInfoResponse))
)]
pub async fn api_info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        name: API_NAME.to_string(),
        version: API_VERSION.to_string(),
        description: API_DESCRIPTION.to_string(),
    })
}

/// Readiness of the user store and token blacklist
#[utoipa::path(
    get,
    path = "/api/ready/",
    tag = "health",
    responses(
        (status = 200, description = "User store and token blacklist are reachable"),
        (status = 503, description = "A dependency is unavailable")
    )
)]
pub async fn ready_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let db_health = match state.database.health_check().await {
        Ok(health) if health.connected => health,
        Ok(health) => {
            error!("Database not ready: {}", health.status);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Err(e) => {
            error!("Database health check failed: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    if let Err(e) = state.blacklist.ping().await {
        error!("Token blacklist ping failed: {}", e);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let blacklist_stats = state.blacklist.stats().await.unwrap_or_default();

    Ok(Json(json!({
        "status": "ready",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "users": db_health.user_count,
        "blacklist": {
            "entries": blacklist_stats.entries,
            "lookups": blacklist_stats.lookups,
            "hits": blacklist_stats.hits
        }
    })))
}

/// Fallback for unmatched routes
pub async fn not_found() -> AppError {
    AppError::NotFound
}

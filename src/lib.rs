//! Rempo API: health and info endpoints plus JWT authentication
//! (register, login, logout, current user, token refresh).

pub mod blacklist;
pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod openapi;
pub mod utils;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use blacklist::TokenBlacklist;
use config::Config;
use database::AuthDatabase;
use utils::{jwt::JwtManager, password::PasswordManager};

pub use openapi::ApiDoc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Arc<dyn AuthDatabase>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub jwt: Arc<JwtManager>,
    pub passwords: Arc<PasswordManager>,
}

impl AppState {
    pub fn new(
        config: Config,
        database: Arc<dyn AuthDatabase>,
        blacklist: Arc<dyn TokenBlacklist>,
    ) -> anyhow::Result<Self> {
        let jwt = JwtManager::from_config(&config.auth.jwt)?;
        let passwords = PasswordManager::new(config.auth.password.bcrypt_rounds);

        Ok(Self {
            config: Arc::new(config),
            database,
            blacklist,
            jwt: Arc::new(jwt),
            passwords: Arc::new(passwords),
        })
    }
}

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let public_auth_routes = Router::new()
        .route("/register/", post(handlers::register))
        .route("/login/", post(handlers::login))
        .route("/token/refresh/", post(handlers::token_refresh));

    let protected_auth_routes = Router::new()
        .route("/logout/", post(handlers::logout))
        .route("/user/", get(handlers::user_info))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::jwt_auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health/", get(handlers::health_check))
        .route("/info/", get(handlers::api_info))
        .route("/ready/", get(handlers::ready_check))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest(
            "/auth",
            public_auth_routes.merge(protected_auth_routes),
        );

    let cors = middleware::create_cors_layer(&state.config.cors);

    Router::new()
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{errors, handlers, models, utils};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::health::api_info,
        handlers::health::ready_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::user_info,
        handlers::auth::token_refresh,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::health::ApiInfoResponse,
            models::user::RegisterRequest,
            models::user::LoginRequest,
            models::user::RefreshRequest,
            models::user::UserResponse,
            models::user::TokenPair,
            models::user::AuthResponse,
            models::user::TokenRefreshResponse,
            models::user::MessageResponse,
            errors::ErrorResponse,
            errors::ErrorDetail,
            utils::jwt::Claims,
            utils::jwt::TokenType,
        )
    ),
    tags(
        (name = "authentication", description = "Registration, login, logout and token refresh"),
        (name = "health", description = "Service health and information")
    ),
    info(
        title = "Rempo API",
        version = "1.0.0",
        description = "Django REST API for Rempo application"
    ),
    modifiers(&SecurityAddon),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from login or register"))
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health/",
            "/api/info/",
            "/api/ready/",
            "/api/auth/register/",
            "/api/auth/login/",
            "/api/auth/logout/",
            "/api/auth/user/",
            "/api/auth/token/refresh/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert_eq!(doc.info.title, "Rempo API");
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("Bearer"));
    }
}

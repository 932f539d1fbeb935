use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

use crate::{
    errors::AppError,
    observability::logging::{log_security_event, SecurityEventType},
    utils::jwt::{TokenType, TokenValidationResult},
    AppState,
};

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// JWT authentication middleware
/// Validates the bearer access token and adds its claims to request extensions
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
    {
        Some(header) => match extract_bearer_token(header) {
            Some(token) => token.to_string(),
            None => {
                warn!("Invalid Authorization header format");
                return Err(AppError::Unauthorized);
            }
        },
        None => {
            warn!("Missing Authorization header");
            return Err(AppError::Unauthorized);
        }
    };

    let claims = match state.jwt.validate_token_detailed(&token, TokenType::Access) {
        TokenValidationResult::Valid(claims) => claims,
        TokenValidationResult::Expired => {
            warn!("Expired access token");
            return Err(AppError::InvalidToken("Token has expired".to_string()));
        }
        TokenValidationResult::WrongType => {
            warn!("Non-access token used for authentication");
            return Err(AppError::InvalidToken(
                "Token has wrong type".to_string(),
            ));
        }
        TokenValidationResult::Invalid => {
            warn!("Invalid JWT token");
            return Err(AppError::InvalidToken("Token is invalid".to_string()));
        }
    };

    match state.blacklist.is_revoked(&claims.jti).await {
        Ok(false) => {}
        Ok(true) => {
            log_security_event(
                SecurityEventType::TokenRejected,
                &claims.sub,
                "revoked access token",
            );
            return Err(AppError::InvalidToken("Token is blacklisted".to_string()));
        }
        Err(e) => {
            error!("Blacklist lookup failed: {:?}", e);
            return Err(AppError::Cache(e.to_string()));
        }
    }

    // Verify user still exists and is active
    let user_id = claims
        .user_id()
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;
    match state.database.find_user_by_id(user_id).await {
        Ok(Some(user)) => {
            if !user.is_active {
                warn!("Token for inactive user: {}", user.username);
                return Err(AppError::Forbidden);
            }
        }
        Ok(None) => {
            warn!("Token for non-existent user: {}", claims.sub);
            return Err(AppError::Unauthorized);
        }
        Err(e) => {
            error!("Database error during token validation: {:?}", e);
            return Err(e.into());
        }
    }

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

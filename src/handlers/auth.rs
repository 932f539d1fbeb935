use axum::{extract::State, http::StatusCode, response::Json, Extension};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult, ErrorResponse},
    models::user::{
        AuthResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest,
        TokenPair, TokenRefreshResponse, User, UserResponse,
    },
    observability::logging::{log_security_event, SecurityEventType},
    utils::{
        jwt::{Claims, TokenType},
        password::{PasswordManager, PasswordValidationResult},
        validation::{normalize_email, validate_username},
    },
    AppState,
};

// bcrypt is deliberately slow, keep it off the async workers
async fn hash_password(passwords: Arc<PasswordManager>, password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || passwords.hash_password(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {:?}", e);
            AppError::Internal
        })?
        .map_err(|e| {
            error!("Password hashing failed: {:?}", e);
            AppError::Internal
        })
}

async fn verify_password(
    passwords: Arc<PasswordManager>,
    password: String,
    hash: String,
) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || passwords.verify_password(&password, &hash))
        .await
        .map_err(|e| {
            error!("Password verification task failed: {:?}", e);
            AppError::Internal
        })?
        .map_err(|e| {
            error!("Password verification error: {:?}", e);
            AppError::Internal
        })
}

fn issue_tokens(state: &AppState, user: &User) -> AppResult<TokenPair> {
    state
        .jwt
        .generate_token_pair(user.id, &user.username)
        .map_err(|e| {
            error!("JWT token creation failed: {:?}", e);
            AppError::Internal
        })
}

fn required_refresh(payload: RefreshRequest) -> AppResult<String> {
    payload
        .refresh
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| AppError::validation("refresh: This field is required."))
}

/// Register a new account and return a token pair
#[utoipa::path(
    post,
    path = "/api/auth/register/",
    tag = "authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    debug!("Registration attempt for username: {}", payload.username);

    payload.email = normalize_email(&payload.email);
    payload.validate()?;
    validate_username(&payload.username).map_err(AppError::validation)?;

    if let PasswordValidationResult::Invalid(issues) =
        state
            .passwords
            .validate_password(&payload.password, &payload.username, &payload.email)
    {
        return Err(AppError::validation(format!(
            "password: {}",
            issues.join(" ")
        )));
    }

    let password_hash = hash_password(state.passwords.clone(), payload.password.clone()).await?;

    let created_user = match state
        .database
        .create_user(User::new(payload, password_hash))
        .await
    {
        Ok(user) => user,
        Err(e) => {
            warn!("Registration rejected: {}", e);
            return Err(e.into());
        }
    };

    let tokens = issue_tokens(&state, &created_user)?;

    info!("User registered successfully: {}", created_user.username);
    log_security_event(
        SecurityEventType::Registration,
        &created_user.id.to_string(),
        "account created",
    );

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            user: created_user.to_response(),
            tokens,
        }),
    ))
}

/// Exchange username and password for a token pair
#[utoipa::path(
    post,
    path = "/api/auth/login/",
    tag = "authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    debug!("Login attempt for username: {}", payload.username);

    payload.validate()?;

    let user = match state.database.find_user_by_username(&payload.username).await? {
        Some(user) => user,
        None => {
            log_security_event(
                SecurityEventType::LoginFailure,
                &payload.username,
                "unknown username",
            );
            return Err(AppError::Unauthorized);
        }
    };

    if !user.is_active {
        log_security_event(
            SecurityEventType::LoginFailure,
            &user.id.to_string(),
            "inactive account",
        );
        return Err(AppError::Unauthorized);
    }

    let password_valid = verify_password(
        state.passwords.clone(),
        payload.password,
        user.password_hash.clone(),
    )
    .await?;

    if !password_valid {
        log_security_event(
            SecurityEventType::LoginFailure,
            &user.id.to_string(),
            "wrong password",
        );
        return Err(AppError::Unauthorized);
    }

    let user = state.database.record_login(user.id).await?;
    let tokens = issue_tokens(&state, &user)?;

    info!("User logged in successfully: {}", user.username);
    log_security_event(SecurityEventType::LoginSuccess, &user.id.to_string(), "");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: user.to_response(),
        tokens,
    }))
}

/// Revoke the given refresh token and the access token used for the call
#[utoipa::path(
    post,
    path = "/api/auth/logout/",
    tag = "authentication",
    request_body = RefreshRequest,
    security(("Bearer" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Missing or invalid refresh token", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<MessageResponse>> {
    let refresh = required_refresh(payload)?;

    let refresh_claims = match state
        .jwt
        .validate_token_of_type(&refresh, TokenType::Refresh)
    {
        Ok(refresh_claims) => refresh_claims,
        Err(e) => {
            warn!("Logout with invalid refresh token: {:?}", e);
            return Err(AppError::validation("Invalid refresh token"));
        }
    };

    if refresh_claims.sub != claims.sub {
        warn!(
            "User {} tried to revoke a refresh token owned by {}",
            claims.sub, refresh_claims.sub
        );
        return Err(AppError::validation("Invalid refresh token"));
    }

    // Atomic check-and-revoke
    let newly_revoked = state
        .blacklist
        .revoke(&refresh_claims.jti, refresh_claims.expires_at())
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;
    if !newly_revoked {
        warn!("Logout with already revoked refresh token for user {}", claims.sub);
        return Err(AppError::validation("Invalid refresh token"));
    }

    state
        .blacklist
        .revoke(&claims.jti, claims.expires_at())
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;

    info!("User logged out: {}", claims.sub);
    log_security_event(SecurityEventType::LogoutSuccess, &claims.sub, "tokens revoked");

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/auth/user/",
    tag = "authentication",
    security(("Bearer" = [])),
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn user_info(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<UserResponse>> {
    let user_id = claims
        .user_id()
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;

    match state.database.find_user_by_id(user_id).await? {
        Some(user) => Ok(Json(user.to_response())),
        None => {
            warn!("Profile request for non-existent user: {}", claims.sub);
            Err(AppError::Unauthorized)
        }
    }
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/token/refresh/",
    tag = "authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenRefreshResponse),
        (status = 400, description = "Missing refresh token", body = ErrorResponse),
        (status = 401, description = "Refresh token invalid, expired or revoked", body = ErrorResponse)
    )
)]
pub async fn token_refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<TokenRefreshResponse>> {
    let refresh = required_refresh(payload)?;

    let claims = state
        .jwt
        .validate_token_of_type(&refresh, TokenType::Refresh)
        .map_err(|e| {
            log_security_event(SecurityEventType::TokenRejected, "", "invalid refresh token");
            AppError::InvalidToken(e.to_string())
        })?;

    let revoked = state
        .blacklist
        .is_revoked(&claims.jti)
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;
    if revoked {
        log_security_event(
            SecurityEventType::TokenRejected,
            &claims.sub,
            "revoked refresh token",
        );
        return Err(AppError::InvalidToken("Token is blacklisted".to_string()));
    }

    let user_id = claims
        .user_id()
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;
    let user = match state.database.find_user_by_id(user_id).await? {
        Some(user) if user.is_active => user,
        Some(_) => {
            warn!("Token refresh for inactive user: {}", claims.sub);
            return Err(AppError::InvalidToken("User is inactive".to_string()));
        }
        None => {
            warn!("Refresh token for non-existent user: {}", claims.sub);
            return Err(AppError::InvalidToken("User not found".to_string()));
        }
    };

    let access = state
        .jwt
        .generate_access_token(user.id, &user.username)
        .map_err(|e| {
            error!("Failed to generate new access token: {:?}", e);
            AppError::Internal
        })?;

    log_security_event(SecurityEventType::TokenRefreshed, &claims.sub, "");

    Ok(Json(TokenRefreshResponse { access }))
}

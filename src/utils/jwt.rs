use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::auth::JwtConfig;
use crate::models::user::TokenPair;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub sub: String,           // Subject (user ID)
    pub username: String,      // Username at issue time
    pub exp: i64,              // Expiration time (Unix timestamp)
    pub iat: i64,              // Issued at (Unix timestamp)
    pub jti: String,           // JWT ID (for blacklisting)
    pub token_type: TokenType, // access or refresh
}

impl Claims {
    pub fn user_id(&self) -> Result<u64> {
        self.sub
            .parse()
            .with_context(|| format!("Invalid subject in token: {}", self.sub))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Token validation result for middleware
#[derive(Debug)]
pub enum TokenValidationResult {
    Valid(Claims),
    Expired,
    WrongType,
    Invalid,
}

/// Issues and validates HS256 access/refresh tokens
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_lifetime: Duration,
    refresh_token_lifetime: Duration,
}

impl JwtManager {
    pub fn new(
        secret: &str,
        access_token_lifetime: Duration,
        refresh_token_lifetime: Duration,
    ) -> Self {
        // No leeway: a token stops validating exactly when its blacklist entry lapses
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            access_token_lifetime,
            refresh_token_lifetime,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        let access = Duration::try_minutes(config.access_token_lifetime_minutes).ok_or_else(|| {
            anyhow!(
                "Access token lifetime out of range: {} minutes",
                config.access_token_lifetime_minutes
            )
        })?;
        let refresh = Duration::try_days(config.refresh_token_lifetime_days).ok_or_else(|| {
            anyhow!(
                "Refresh token lifetime out of range: {} days",
                config.refresh_token_lifetime_days
            )
        })?;

        Ok(Self::new(&config.secret, access, refresh))
    }

    fn generate_token(
        &self,
        user_id: u64,
        username: &str,
        token_type: TokenType,
        lifetime: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(lifetime)
            .context("Token expiry out of range")?;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .with_context(|| format!("Failed to generate {:?} token", token_type))
    }

    /// Generate an access token for the user
    pub fn generate_access_token(&self, user_id: u64, username: &str) -> Result<String> {
        self.generate_token(
            user_id,
            username,
            TokenType::Access,
            self.access_token_lifetime,
        )
    }

    /// Generate a refresh token for the user
    pub fn generate_refresh_token(&self, user_id: u64, username: &str) -> Result<String> {
        self.generate_token(
            user_id,
            username,
            TokenType::Refresh,
            self.refresh_token_lifetime,
        )
    }

    /// Generate both access and refresh tokens
    pub fn generate_token_pair(&self, user_id: u64, username: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.generate_access_token(user_id, username)?,
            refresh: self.generate_refresh_token(user_id, username)?,
        })
    }

    /// Validate signature and expiration and decode the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("Invalid token")?;
        Ok(token_data.claims)
    }

    /// Validate a token and require the given type
    pub fn validate_token_of_type(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(anyhow!(
                "Expected {:?} token, got {:?}",
                expected,
                claims.token_type
            ));
        }
        Ok(claims)
    }

    /// Validate token and return detailed result for middleware
    pub fn validate_token_detailed(&self, token: &str, expected: TokenType) -> TokenValidationResult {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) if data.claims.token_type == expected => {
                TokenValidationResult::Valid(data.claims)
            }
            Ok(_) => TokenValidationResult::WrongType,
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => TokenValidationResult::Expired,
                _ => TokenValidationResult::Invalid,
            },
        }
    }
}

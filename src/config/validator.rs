use anyhow::{anyhow, Result};

use crate::config::Config;

// One year of access, ten years of refresh
const MAX_ACCESS_TOKEN_LIFETIME_MINUTES: i64 = 365 * 24 * 60;
const MAX_REFRESH_TOKEN_LIFETIME_DAYS: i64 = 3650;

/// Configuration validator run at startup
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration for any environment
    pub fn validate_basic(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        if config.server.port == 0 {
            errors.push("Server port must be specified (non-zero)".to_string());
        }

        let jwt = &config.auth.jwt;
        if jwt.secret.is_empty() {
            errors.push("JWT secret cannot be empty".to_string());
        }

        if jwt.access_token_lifetime_minutes <= 0 {
            errors.push("Access token lifetime must be positive".to_string());
        } else if jwt.access_token_lifetime_minutes > MAX_ACCESS_TOKEN_LIFETIME_MINUTES {
            errors.push(format!(
                "Access token lifetime must not exceed {} minutes",
                MAX_ACCESS_TOKEN_LIFETIME_MINUTES
            ));
        }

        if jwt.refresh_token_lifetime_days <= 0 {
            errors.push("Refresh token lifetime must be positive".to_string());
        } else if jwt.refresh_token_lifetime_days > MAX_REFRESH_TOKEN_LIFETIME_DAYS {
            errors.push(format!(
                "Refresh token lifetime must not exceed {} days",
                MAX_REFRESH_TOKEN_LIFETIME_DAYS
            ));
        }

        let refresh_minutes = jwt.refresh_token_lifetime_days.checked_mul(24 * 60);
        if matches!(refresh_minutes, Some(minutes) if jwt.access_token_lifetime_minutes >= minutes) {
            errors.push("Access token lifetime must be shorter than refresh token lifetime".to_string());
        }

        // bcrypt accepts costs 4..=31
        if !(4..=31).contains(&config.auth.password.bcrypt_rounds) {
            errors.push("Password hash rounds must be between 4 and 31".to_string());
        }

        if config.blacklist.cleanup_interval_secs == 0 {
            errors.push("Blacklist cleanup interval must be at least 1 second".to_string());
        }

        if !errors.is_empty() {
            return Err(anyhow!(
                "Basic configuration validation failed:\n{}",
                errors.join("\n")
            ));
        }

        Ok(())
    }

    /// Warnings that do not prevent startup but should not reach production
    pub fn security_warnings(config: &Config) -> Vec<String> {
        let mut warnings = Vec::new();

        if config.auth.jwt.secret.len() < 32 {
            warnings.push("JWT secret should be at least 32 characters".to_string());
        }

        if config.auth.jwt.secret.contains("change-in-production") {
            warnings.push("JWT secret is still the built-in default".to_string());
        }

        if config.auth.password.bcrypt_rounds < 10 {
            warnings.push("Password hash rounds should be at least 10".to_string());
        }

        if config.cors.allowed_origins.is_empty()
            || config.cors.allowed_origins.iter().any(|o| o == "*")
        {
            warnings.push("CORS allows all origins".to_string());
        }

        warnings
    }
}

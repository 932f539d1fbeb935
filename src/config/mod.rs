use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub mod auth;
pub mod blacklist;
pub mod database;
pub mod server;
pub mod validator;

use crate::observability::logging::{LogFormat, LoggingConfig};
use auth::AuthConfig;
use blacklist::BlacklistConfig;
use database::DatabaseConfig;
use server::{CorsConfig, ServerConfig};

pub use validator::ConfigValidator;

const DEFAULT_CONFIG_PATH: &str = "config.yml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub blacklist: BlacklistConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load `config.yml` (or the file named by `CONFIG_PATH`) when present,
    /// then apply environment overrides.
    pub fn from_env_and_file() -> Result<Self> {
        let path = env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_yaml_file(&path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides(|key| env::var(key).ok())?;
        ConfigValidator::validate_basic(&config)?;

        Ok(config)
    }

    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let config_str =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        Self::from_yaml_str(&config_str).with_context(|| format!("Failed to parse {}", path))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str::<Config>(yaml).context("Invalid configuration YAML")
    }

    /// Override fields from environment-style variables supplied by `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port.parse().context("Invalid SERVER_PORT")?;
        }

        if let Some(jwt_secret) = lookup("JWT_SECRET") {
            self.auth.jwt.secret = jwt_secret;
        }
        if let Some(minutes) = lookup("ACCESS_TOKEN_LIFETIME_MINUTES") {
            self.auth.jwt.access_token_lifetime_minutes = minutes
                .parse()
                .context("Invalid ACCESS_TOKEN_LIFETIME_MINUTES")?;
        }
        if let Some(days) = lookup("REFRESH_TOKEN_LIFETIME_DAYS") {
            self.auth.jwt.refresh_token_lifetime_days = days
                .parse()
                .context("Invalid REFRESH_TOKEN_LIFETIME_DAYS")?;
        }
        if let Some(bcrypt_rounds) = lookup("BCRYPT_ROUNDS") {
            self.auth.password.bcrypt_rounds =
                bcrypt_rounds.parse().context("Invalid BCRYPT_ROUNDS")?;
        }

        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
        }

        Ok(())
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Log format (json, pretty, compact)
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "rempo_api=debug,tower_http=debug".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_timer(ChronoUtc::rfc_3339()))
            .try_init()?,
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_timer(ChronoUtc::rfc_3339()))
            .try_init()?,
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum SecurityEventType {
    Registration,
    LoginSuccess,
    LoginFailure,
    LogoutSuccess,
    TokenRefreshed,
    TokenRejected,
}

impl SecurityEventType {
    fn is_failure(self) -> bool {
        matches!(
            self,
            SecurityEventType::LoginFailure | SecurityEventType::TokenRejected
        )
    }
}

/// Emit an audit line for an authentication event
pub fn log_security_event(event_type: SecurityEventType, subject: &str, detail: &str) {
    if event_type.is_failure() {
        tracing::warn!(
            event_type = ?event_type,
            subject = %subject,
            detail = %detail,
            "Security event"
        );
    } else {
        tracing::info!(
            event_type = ?event_type,
            subject = %subject,
            detail = %detail,
            "Security event"
        );
    }
}

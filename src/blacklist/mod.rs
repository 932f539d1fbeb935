use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

pub mod memory;

pub use memory::MemoryBlacklist;

use crate::config::blacklist::BlacklistConfig;

/// Revoked-token registry keyed by JWT id (`jti`).
///
/// Entries only need to live as long as the token they revoke; once the
/// token's own `exp` has passed, signature validation rejects it anyway.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Revoke `jti` until `expires_at`.
    /// Returns `false` when `jti` was already revoked.
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool>;

    /// Check whether `jti` has been revoked
    async fn is_revoked(&self, jti: &str) -> Result<bool>;

    /// Drop entries whose tokens have expired, returning how many were removed
    async fn purge_expired(&self) -> Result<usize>;

    /// Check if the blacklist backend is reachable
    async fn ping(&self) -> Result<()>;

    /// Get blacklist statistics
    async fn stats(&self) -> Result<BlacklistStats>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlacklistStats {
    pub entries: usize,
    pub lookups: u64,
    pub hits: u64,
}

/// Create the blacklist backend named by configuration and start its purge task
pub fn create_blacklist(config: &BlacklistConfig) -> Result<Arc<dyn TokenBlacklist>> {
    let blacklist: Arc<dyn TokenBlacklist> = match config.r#type.as_str() {
        "memory" => Arc::new(MemoryBlacklist::new()),
        _ => {
            return Err(anyhow::anyhow!(
                "Unsupported blacklist type: {}",
                config.r#type
            ))
        }
    };

    spawn_cleanup(
        &blacklist,
        Duration::from_secs(config.cleanup_interval_secs),
    );
    Ok(blacklist)
}

/// Purge expired entries every `interval` until the blacklist is dropped.
/// Must be called from within a Tokio runtime.
pub fn spawn_cleanup(blacklist: &Arc<dyn TokenBlacklist>, interval: Duration) -> JoinHandle<()> {
    let blacklist = Arc::downgrade(blacklist);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let Some(blacklist) = blacklist.upgrade() else {
                debug!("Token blacklist dropped, stopping cleanup");
                break;
            };
            match blacklist.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!("Purged {} expired blacklist entries", removed),
                Err(e) => error!("Blacklist cleanup failed: {}", e),
            }
        }
    })
}

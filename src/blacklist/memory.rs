use super::{BlacklistStats, TokenBlacklist};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Counters {
    lookups: u64,
    hits: u64,
}

/// In-process blacklist. Expired entries stay until `purge_expired` runs.
#[derive(Default)]
pub struct MemoryBlacklist {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
    counters: RwLock<Counters>,
}

impl MemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlacklist for MemoryBlacklist {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let live = entries.get(jti).copied().filter(|existing| *existing > now);
        if let Some(existing) = live {
            // Keep the later expiry if a jti is revoked twice
            if expires_at > existing {
                entries.insert(jti.to_string(), expires_at);
            }
            return Ok(false);
        }

        entries.insert(jti.to_string(), expires_at);
        debug!("Revoked token {} until {}", jti, expires_at.to_rfc3339());
        Ok(true)
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool> {
        let revoked = {
            let entries = self.entries.read().await;
            entries
                .get(jti)
                .map(|expires_at| *expires_at > Utc::now())
                .unwrap_or(false)
        };

        let mut counters = self.counters.write().await;
        counters.lookups += 1;
        if revoked {
            counters.hits += 1;
        }

        Ok(revoked)
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok(before - entries.len())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<BlacklistStats> {
        let entries = self.entries.read().await;
        let counters = self.counters.read().await;

        Ok(BlacklistStats {
            entries: entries.len(),
            lookups: counters.lookups,
            hits: counters.hits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_revoke_and_lookup() {
        let blacklist = MemoryBlacklist::new();
        let expires = Utc::now() + Duration::hours(1);

        assert!(!blacklist.is_revoked("abc").await.unwrap());
        assert!(blacklist.revoke("abc", expires).await.unwrap());
        assert!(blacklist.is_revoked("abc").await.unwrap());
        assert!(!blacklist.is_revoked("def").await.unwrap());

        let stats = blacklist.stats().await.unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.lookups, 3);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_second_revoke_reports_already_revoked() {
        let blacklist = MemoryBlacklist::new();
        let expires = Utc::now() + Duration::hours(1);

        assert!(blacklist.revoke("jti", expires).await.unwrap());
        assert!(!blacklist.revoke("jti", expires).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_revokes_have_one_winner() {
        let blacklist = std::sync::Arc::new(MemoryBlacklist::new());
        let expires = Utc::now() + Duration::hours(1);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let blacklist = blacklist.clone();
            handles.push(tokio::spawn(async move {
                blacklist.revoke("shared", expires).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_revoked() {
        let blacklist = MemoryBlacklist::new();
        blacklist
            .revoke("old", Utc::now() - Duration::seconds(5))
            .await
            .unwrap();

        assert!(!blacklist.is_revoked("old").await.unwrap());
        // A lapsed entry can be revoked afresh
        assert!(blacklist
            .revoke("old", Utc::now() - Duration::seconds(1))
            .await
            .unwrap());
        assert_eq!(blacklist.purge_expired().await.unwrap(), 1);
        assert_eq!(blacklist.stats().await.unwrap().entries, 0);
    }

    #[tokio::test]
    async fn test_revoking_twice_keeps_later_expiry() {
        let blacklist = MemoryBlacklist::new();
        let later = Utc::now() + Duration::hours(2);
        blacklist.revoke("jti", later).await.unwrap();
        blacklist
            .revoke("jti", Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert!(blacklist.is_revoked("jti").await.unwrap());
    }
}

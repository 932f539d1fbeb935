use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

use super::{AuthDatabase, DatabaseHealth};
use crate::models::user::{User, UserError};

#[derive(Default)]
struct Inner {
    users: HashMap<u64, User>,
    next_id: u64,
}

/// In-process user store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryDatabase {
    inner: RwLock<Inner>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthDatabase for MemoryDatabase {
    async fn create_user(&self, mut user: User) -> Result<User, UserError> {
        let username = user.username.to_lowercase();
        let email = user.email.to_lowercase();

        // Check and insert under one lock so concurrent registrations can't race
        let mut inner = self.inner.write().await;

        if inner
            .users
            .values()
            .any(|u| u.username.to_lowercase() == username)
        {
            return Err(UserError::UsernameAlreadyExists);
        }
        if inner.users.values().any(|u| u.email.to_lowercase() == email) {
            return Err(UserError::EmailAlreadyExists);
        }

        inner.next_id += 1;
        user.id = inner.next_id;
        inner.users.insert(user.id, user.clone());

        debug!("Stored user {} with id {}", user.username, user.id);
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: u64) -> Result<Option<User>, UserError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn record_login(&self, user_id: u64) -> Result<User, UserError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&user_id).ok_or(UserError::NotFound)?;
        user.record_login();
        Ok(user.clone())
    }

    async fn deactivate_user(&self, user_id: u64) -> Result<(), UserError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&user_id).ok_or(UserError::NotFound)?;
        user.is_active = false;
        Ok(())
    }

    async fn health_check(&self) -> Result<DatabaseHealth> {
        let start = Instant::now();
        let user_count = self.inner.read().await.users.len();

        Ok(DatabaseHealth {
            status: "healthy".to_string(),
            database_type: "memory".to_string(),
            connected: true,
            response_time_ms: start.elapsed().as_millis() as u64,
            user_count,
        })
    }
}

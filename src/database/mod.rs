use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;

pub use memory::MemoryDatabase;

use crate::config::database::DatabaseConfig;
use crate::models::user::{User, UserError};

/// Database health status
#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub database_type: String,
    pub connected: bool,
    pub response_time_ms: u64,
    pub user_count: usize,
}

/// Storage operations needed by the authentication endpoints
#[async_trait]
pub trait AuthDatabase: Send + Sync {
    /// Insert a new user and assign its id. Fails if the username or email
    /// is already taken (case-insensitive).
    async fn create_user(&self, user: User) -> Result<User, UserError>;

    /// Find user by exact username
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, UserError>;

    /// Find user by id
    async fn find_user_by_id(&self, user_id: u64) -> Result<Option<User>, UserError>;

    /// Stamp `last_login` and return the updated user
    async fn record_login(&self, user_id: u64) -> Result<User, UserError>;

    /// Mark a user inactive
    async fn deactivate_user(&self, user_id: u64) -> Result<(), UserError>;

    /// Get database health status
    async fn health_check(&self) -> Result<DatabaseHealth>;
}

/// Create database instance based on configuration
pub async fn create_database(config: &DatabaseConfig) -> Result<Box<dyn AuthDatabase>> {
    match config.r#type.as_str() {
        "memory" => Ok(Box::new(MemoryDatabase::new())),
        _ => Err(anyhow::anyhow!(
            "Unsupported database type: {}",
            config.r#type
        )),
    }
}

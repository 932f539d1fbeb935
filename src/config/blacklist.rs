use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlacklistConfig {
    pub r#type: String, // memory
    pub cleanup_interval_secs: u64,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            r#type: "memory".to_string(),
            cleanup_interval_secs: 300,
        }
    }
}

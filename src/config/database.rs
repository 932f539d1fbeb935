use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub r#type: String, // memory
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            r#type: "memory".to_string(),
        }
    }
}

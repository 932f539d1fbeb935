use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_lifetime_minutes: i64,
    pub refresh_token_lifetime_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub bcrypt_rounds: u32,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "your-secret-key-change-in-production".to_string(),
            access_token_lifetime_minutes: 60,
            refresh_token_lifetime_days: 1,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self { bcrypt_rounds: 12 }
    }
}

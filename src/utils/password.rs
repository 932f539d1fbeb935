use anyhow::{Context, Result};
use bcrypt::{hash, verify};

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 128;

// Exact-match list, compared case-insensitively
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "123456",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty",
    "qwerty123",
    "qwertyuiop",
    "abc123",
    "abcdefgh",
    "admin",
    "admin123",
    "letmein",
    "welcome",
    "welcome1",
    "iloveyou",
    "monkey",
    "dragon",
    "football",
    "baseball",
    "sunshine",
    "princess",
    "trustno1",
    "passw0rd",
    "superman",
    "starwars",
    "11111111",
    "00000000",
];

#[derive(Debug, Clone)]
pub struct PasswordManager {
    cost: u32,
}

impl PasswordManager {
    /// Create a new password manager with the specified bcrypt cost
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        hash(password, self.cost).context("Failed to hash password")
    }

    /// Verify a password against its hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        verify(password, hash).context("Failed to verify password")
    }

    /// Check a candidate password against the account's attributes.
    /// All violations are collected rather than stopping at the first.
    pub fn validate_password(
        &self,
        password: &str,
        username: &str,
        email: &str,
    ) -> PasswordValidationResult {
        let mut issues = Vec::new();
        let length = password.chars().count();

        if length < MIN_LENGTH {
            issues.push(format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_LENGTH
            ));
        }

        if length > MAX_LENGTH {
            issues.push(format!(
                "This password is too long. It must not exceed {} characters.",
                MAX_LENGTH
            ));
        }

        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            issues.push("This password is entirely numeric.".to_string());
        }

        if is_common_password(password) {
            issues.push("This password is too common.".to_string());
        }

        let email_local = email.split('@').next().unwrap_or_default();
        if is_too_similar(password, username) || is_too_similar(password, email_local) {
            issues.push("The password is too similar to the username or email.".to_string());
        }

        if issues.is_empty() {
            PasswordValidationResult::Valid
        } else {
            PasswordValidationResult::Invalid(issues)
        }
    }
}

fn is_common_password(password: &str) -> bool {
    let lower = password.to_lowercase();
    COMMON_PASSWORDS.iter().any(|&common| common == lower)
}

fn is_too_similar(password: &str, attribute: &str) -> bool {
    let attribute = attribute.to_lowercase();
    if attribute.chars().count() < 3 {
        return false;
    }
    let password = password.to_lowercase();
    password.contains(&attribute) || attribute.contains(&password)
}

#[derive(Debug, PartialEq)]
pub enum PasswordValidationResult {
    Valid,
    Invalid(Vec<String>),
}

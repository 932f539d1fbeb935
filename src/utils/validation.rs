use regex::Regex;
use std::sync::OnceLock;

const USERNAME_MAX_LENGTH: usize = 150;

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Word characters plus @ . + -
    RE.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("username regex is valid"))
}

/// Validate a username: 1 to 150 characters of letters, digits and `@ . + - _`
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(format!(
            "Username must not exceed {} characters",
            USERNAME_MAX_LENGTH
        ));
    }

    if !username_regex().is_match(username) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }

    Ok(())
}

/// Normalize an email the way account registration stores it:
/// trimmed, with the domain part lowercased.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

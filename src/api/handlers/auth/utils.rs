//! Input validation helpers for the auth handlers.

use regex::Regex;

/// Basic email format check on already-normalized input.
#[must_use]
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Password strength rule applied at signup and reset: at least 8 characters
/// with upper, lower, digit, and a non-alphanumeric character.
#[must_use]
pub(crate) fn strong_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

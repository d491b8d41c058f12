//! Password strength rules for wallet setup

use serde::Serialize;

pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Outcome of each strength rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PasswordValidation {
    pub meets_length_requirement: bool,
    pub has_lowercase: bool,
    pub has_uppercase: bool,
    pub has_number: bool,
    pub has_symbol: bool,
    pub not_all_same_char: bool,
    pub meets_all_strength_requirements: bool,
}

impl PasswordValidation {
    /// Result for an empty password: every rule fails
    pub fn blank() -> Self {
        Self::default()
    }
}

pub fn validate_password(password: &str) -> PasswordValidation {
    if password.trim().is_empty() {
        return PasswordValidation::blank();
    }

    let mut chars = password.chars();
    let first = chars.next();

    let mut result = PasswordValidation {
        meets_length_requirement: password.chars().count() >= MIN_PASSWORD_LENGTH,
        has_lowercase: password.chars().any(char::is_lowercase),
        has_uppercase: password.chars().any(char::is_uppercase),
        has_number: password.chars().any(|c| c.is_ascii_digit()),
        has_symbol: password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        not_all_same_char: chars.any(|c| Some(c) != first),
        meets_all_strength_requirements: false,
    };

    result.meets_all_strength_requirements = result.meets_length_requirement
        && result.has_lowercase
        && result.has_uppercase
        && result.has_number
        && result.has_symbol
        && result.not_all_same_char;

    result
}

/// Confirmation check. An empty password never matches.
pub fn passwords_match(password: &str, confirmation: &str) -> bool {
    !password.is_empty() && password == confirmation
}

//! Input validation for the send and onboarding flows

mod address;
mod password;

pub use address::{not_current_address, validate_address};
pub use password::{passwords_match, validate_password, PasswordValidation, MIN_PASSWORD_LENGTH};

//! Local form validation, run before any request leaves the process.

use crate::net::types::{LoginCredentials, RegisterData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("required field `{0}` is empty")]
    MissingField(&'static str),

    #[error("email address is not valid")]
    InvalidEmail,
}

/// Presence only; the email shape is left to whoever checks the credentials.
///
/// # Errors
///
/// Returns the first failing check: empty email, then empty password.
pub fn validate_login(credentials: &LoginCredentials) -> Result<(), ValidationError> {
    require("email", &credentials.email)?;
    require("password", &credentials.password)
}

/// Signup checks in screen order: confirmation first, then required fields.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate_registration(data: &RegisterData) -> Result<(), ValidationError> {
    if data.password != data.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    require("email", &data.email)?;
    require("password", &data.password)?;
    require("name", &data.name)?;
    check_email(&data.email)
}

/// # Errors
///
/// Returns an error when the email is empty or malformed.
pub fn validate_reset_request(email: &str) -> Result<(), ValidationError> {
    require("email", email)?;
    check_email(email)
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Shape check only: one `@` with something on both sides and no spaces.
fn check_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid { Ok(()) } else { Err(ValidationError::InvalidEmail) }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;

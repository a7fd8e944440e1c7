//! Client-side signup form checks.

use crate::error::{ClientError, Result};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Checks the signup password and its confirmation.
///
/// The confirmation is compared first, then the length.
///
/// # Errors
///
/// Returns `ClientError::Validation` with a user-facing message.
pub fn validate_signup(password: &str, confirm_password: &str) -> Result<()> {
    if password != confirm_password {
        return Err(ClientError::Validation(String::from(
            "Passwords do not match",
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

//! Request handlers.

pub mod health;
pub mod otp;
pub mod sessions;
pub mod users;

use crate::error::AppError;

/// Unwrap a required, non-blank request field.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

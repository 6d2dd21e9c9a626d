//! Credential and session lifecycle.
//!
//! Password policy and hashing, one-time codes, signed tokens, rate limiting,
//! and the registration / authentication flows built on top of them.

pub mod authentication;
pub mod jwt;
pub mod otp;
pub mod password;
pub mod policy;
pub mod rate_limit;
pub mod registration;
pub mod session;

use thiserror::Error;

use crate::mail::MailError;
use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Password does not meet the strength policy")]
    WeakPassword,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Basic `local@domain` shape check. The address is otherwise left as given.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".into()));
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(AuthError::Validation("Email address is malformed".into())),
    }
}

//! Registration: prove the email with a one-time code, then admit a password.
//!
//! Step 1 ([`issue_otp`]) persists a code and mails it. Step 2
//! ([`create_user`]) checks the code against the newest record for the email,
//! consumes every outstanding code for that email, and inserts the identity.

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use super::password::hash_password_async;
use super::{AuthError, otp, policy, validate_email};
use crate::mail::{Mailer, OutgoingEmail};
use crate::models::auth::{Identity, NewIdentity};
use crate::store::{CredentialStore, StoreError};

/// Default lifetime of an unconsumed one-time code: 10 minutes.
pub const DEFAULT_OTP_TTL_SECS: i64 = 10 * 60;

/// Input to [`create_user`].
#[derive(Clone, Copy)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: Option<&'a str>,
    pub otp: &'a str,
}

impl std::fmt::Debug for NewUser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

/// Generate a code for `email`, persist it, and mail it.
///
/// A code is issued whether or not the email is already registered. A mail
/// failure is returned to the caller but the stored record is kept.
pub async fn issue_otp(
    store: &dyn CredentialStore,
    mailer: &dyn Mailer,
    email: &str,
) -> Result<(), AuthError> {
    validate_email(email)?;

    let code = otp::generate_default();
    store.insert_otp(email, &code).await?;

    if let Err(e) = mailer.send(&OutgoingEmail::otp(email, &code)).await {
        error!(email, error = %e, "one-time code delivery failed");
        return Err(e.into());
    }

    info!(email, "one-time code issued");
    Ok(())
}

/// Complete registration. Returns the new identity; no token is issued.
pub async fn create_user(
    store: &dyn CredentialStore,
    new_user: NewUser<'_>,
    otp_ttl: Duration,
) -> Result<Identity, AuthError> {
    create_user_at(store, new_user, otp_ttl, Utc::now()).await
}

/// [`create_user`] against an explicit clock.
pub async fn create_user_at(
    store: &dyn CredentialStore,
    new_user: NewUser<'_>,
    otp_ttl: Duration,
    now: DateTime<Utc>,
) -> Result<Identity, AuthError> {
    let NewUser {
        email,
        password,
        full_name,
        otp,
    } = new_user;

    validate_email(email)?;
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".into()));
    }
    if otp.trim().is_empty() {
        return Err(AuthError::Validation("OTP is required".into()));
    }

    consume_otp(store, email, otp.trim(), otp_ttl, now).await?;

    let full_name = match full_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => display_name(email),
    };

    let password = policy::sanitize(password).map_err(|_| AuthError::WeakPassword)?;
    let password_hash = hash_password_async(password.into_inner()).await?;

    let new = NewIdentity {
        email: email.to_string(),
        full_name: Some(full_name),
        password_hash,
    };
    let identity = match store.insert_identity(&new).await {
        Ok(identity) => identity,
        Err(StoreError::Conflict) => return Err(AuthError::EmailTaken),
        Err(e) => return Err(e.into()),
    };

    info!(email, id = identity.id, "identity created");
    Ok(identity)
}

/// Check `code` against the newest record for `email` and, on a match,
/// delete every outstanding record for that email.
async fn consume_otp(
    store: &dyn CredentialStore,
    email: &str,
    code: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    let records = store.otps_for_email(email).await?;
    let newest = records.first().ok_or(AuthError::InvalidOtp)?;

    if newest.code != code {
        return Err(AuthError::InvalidOtp);
    }
    if now - newest.created_at > ttl {
        return Err(AuthError::InvalidOtp);
    }

    store.delete_otps_for_email(email).await?;
    Ok(())
}

/// Derive a display name from the email local-part: `john.doe@x` → `john doe`.
pub fn display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local.split('.').collect::<Vec<_>>().join(" ")
}

//! Authentication: password → refresh token → access token.
//!
//! Refresh tokens are not rotated or revoked; the same one can be exchanged
//! until it expires.

use tracing::{debug, info};

use super::jwt::TokenService;
use super::password::{verify_dummy_async, verify_password_async};
use super::session::require_session;
use super::{AuthError, policy};
use crate::models::auth::{Identity, TokenClaims, TokenKind};
use crate::store::CredentialStore;

/// Exchange an email and password for a refresh token.
pub async fn get_refresh_token(
    store: &dyn CredentialStore,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<String, AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::Validation("Email and password are required".into()));
    }

    let row = store.find_identity_by_email(email).await?;

    // Registration only ever stored hashes of sanitized passwords.
    let (row, password) = match (row, policy::sanitize(password)) {
        (Some(row), Ok(password)) => (row, password),
        (row, sanitized) => {
            debug!(
                known = row.is_some(),
                policy_ok = sanitized.is_ok(),
                "refresh token refused"
            );
            let candidate = sanitized.map_or_else(|_| password.to_string(), |p| p.into_inner());
            verify_dummy_async(candidate).await;
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password_async(password.into_inner(), row.password_hash).await? {
        return Err(AuthError::InvalidCredentials);
    }

    info!(id = row.identity.id, "refresh token issued");
    tokens.issue(row.identity.id, &row.identity.email, TokenKind::Refresh)
}

/// Exchange a refresh token for a fresh access token.
pub fn login(tokens: &TokenService, refresh_token: &str) -> Result<String, AuthError> {
    let claims = tokens
        .verify(refresh_token.trim(), TokenKind::Refresh)
        .map_err(|_| AuthError::InvalidRefreshToken)?;
    let identity_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidRefreshToken)?;
    tokens.issue(identity_id, &claims.email, TokenKind::Access)
}

/// Resolve the identity behind an access token.
pub async fn get_user_info(
    store: &dyn CredentialStore,
    tokens: &TokenService,
    token: Option<&str>,
) -> Result<Identity, AuthError> {
    let claims = require_session(tokens, token)?;
    resolve_identity(store, &claims).await
}

/// Load the identity named by verified claims.
pub async fn resolve_identity(
    store: &dyn CredentialStore,
    claims: &TokenClaims,
) -> Result<Identity, AuthError> {
    let row = store
        .find_identity_by_email(&claims.email)
        .await?
        .ok_or(AuthError::IdentityNotFound)?;
    if row.identity.id.to_string() != claims.sub {
        return Err(AuthError::IdentityNotFound);
    }
    Ok(row.identity)
}

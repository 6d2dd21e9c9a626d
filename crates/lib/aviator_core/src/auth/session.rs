//! Session guard for privileged operations.

use super::AuthError;
use super::jwt::TokenService;
use crate::models::auth::{TokenClaims, TokenKind};

/// Require a valid access token. A missing or blank token fails exactly like
/// an invalid one.
pub fn require_session(
    tokens: &TokenService,
    token: Option<&str>,
) -> Result<TokenClaims, AuthError> {
    match token.map(str::trim) {
        Some(t) if !t.is_empty() => tokens.verify(t, TokenKind::Access),
        _ => Err(AuthError::InvalidToken),
    }
}

//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! models (which have `#[serde(rename)]` for camelCase etc.).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
}

/// Identity with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct IdentityWithPassword {
    pub identity: Identity,
    pub password_hash: String,
}

/// Fields needed to insert a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
}

/// A one-time code issued to an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub id: i64,
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// Trust level of a signed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, accepted by privileged routes.
    Access,
    /// Long-lived, only exchangeable for an access token.
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: identity ID (standard JWT `sub` claim).
    pub sub: String,
    /// Identity email.
    pub email: String,
    /// Access or refresh.
    pub kind: TokenKind,
    /// Unique token ID.
    pub jti: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

//! JWT token issuance and verification.
//!
//! One HS256 secret signs both token kinds. The kind travels as a typed claim
//! and is checked on every verification, so a refresh token is never accepted
//! where an access token is expected and vice versa.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{TokenClaims, TokenKind};

/// Access token lifetime: 1 hour.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 60 * 60;

/// Refresh token lifetime: 30 days.
pub const REFRESH_TOKEN_EXPIRY_SECS: i64 = 30 * 24 * 60 * 60;

/// Signs and verifies access and refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a service over a process-wide secret. An empty secret is refused.
    pub fn new(secret: &[u8]) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Internal("JWT secret must not be empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS),
            refresh_ttl: Duration::seconds(REFRESH_TOKEN_EXPIRY_SECS),
        })
    }

    /// Override the default lifetimes.
    pub fn with_lifetimes(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_ttl = access;
        self.refresh_ttl = refresh;
        self
    }

    /// Lifetime applied to tokens of `kind`.
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a signed token of `kind` for an identity.
    pub fn issue(&self, identity_id: i64, email: &str, kind: TokenKind) -> Result<String, AuthError> {
        self.issue_at(identity_id, email, kind, Utc::now())
    }

    /// [`issue`](Self::issue) with an explicit issue time.
    pub fn issue_at(
        &self,
        identity_id: i64,
        email: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: identity_id.to_string(),
            email: email.to_string(),
            kind,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime(kind)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify a token and require it to be of `expected` kind.
    ///
    /// Every failure collapses to [`AuthError::InvalidToken`]; the reason is
    /// only logged.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, expected, Utc::now())
    }

    /// [`verify`](Self::verify) against an explicit clock.
    pub fn verify_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now`, with no leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = match decode::<TokenClaims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "token rejected");
                return Err(AuthError::InvalidToken);
            }
        };

        if claims.exp <= now.timestamp() {
            debug!(exp = claims.exp, "token rejected: expired");
            return Err(AuthError::InvalidToken);
        }

        if claims.kind != expected {
            debug!(kind = %claims.kind, expected = %expected, "token rejected: wrong kind");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

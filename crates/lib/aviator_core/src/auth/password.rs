//! Password hashing via bcrypt.
//!
//! The async variants move the work onto the blocking pool so a slow hash
//! never stalls other requests.

use std::sync::OnceLock;

use tracing::warn;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("hash task: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_async(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?
}

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// A hash of a throwaway password at the normal cost, computed once.
fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| hash_password("aviator-dummy-Passw0rd!").ok())
        .as_deref()
}

/// Spend the same bcrypt work as a real check, for logins that are already
/// known to fail, so response time does not reveal which check failed.
pub async fn verify_dummy_async(password: String) {
    let result = tokio::task::spawn_blocking(move || {
        if let Some(hash) = dummy_hash() {
            let _ = verify_password(&password, hash);
        }
    })
    .await;
    if let Err(e) = result {
        warn!("dummy verify task failed: {e}");
    }
}

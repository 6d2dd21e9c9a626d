//! Credential store adapter.
//!
//! Owns persistence of identities and one-time-code records. Flows hold a
//! `&dyn CredentialStore` and never cache rows across requests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{Identity, IdentityWithPassword, NewIdentity, OtpRecord};

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Conflict,

    #[error("database error: {0}")]
    Db(sqlx::Error),

    #[error("store error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e
            && db.is_unique_violation()
        {
            return StoreError::Conflict;
        }
        StoreError::Db(e)
    }
}

/// Persistent storage for identities and one-time codes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fetch an identity and its password hash by email.
    async fn find_identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityWithPassword>, StoreError>;

    /// Whether an identity with this email exists.
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Insert a new identity. Fails with [`StoreError::Conflict`] when the
    /// email is already registered.
    async fn insert_identity(&self, new: &NewIdentity) -> Result<Identity, StoreError>;

    /// Record a one-time code for an email.
    async fn insert_otp(&self, email: &str, code: &str) -> Result<OtpRecord, StoreError>;

    /// All outstanding codes for an email, newest first.
    async fn otps_for_email(&self, email: &str) -> Result<Vec<OtpRecord>, StoreError>;

    /// Delete every outstanding code for an email. Returns the number removed.
    async fn delete_otps_for_email(&self, email: &str) -> Result<u64, StoreError>;
}

//! In-process credential store for tests and local development.
//!
//! State lives only as long as the value; nothing is persisted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError};
use crate::models::auth::{Identity, IdentityWithPassword, NewIdentity, OtpRecord};

#[derive(Debug, Default)]
struct Tables {
    identities: Vec<IdentityWithPassword>,
    otps: Vec<OtpRecord>,
    next_identity_id: i64,
    next_otp_id: i64,
}

/// Credential store held in memory behind a `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tables: RwLock<Tables>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a code with an explicit creation time.
    pub async fn insert_otp_at(
        &self,
        email: &str,
        code: &str,
        created_at: DateTime<Utc>,
    ) -> OtpRecord {
        let mut tables = self.tables.write().await;
        tables.next_otp_id += 1;
        let record = OtpRecord {
            id: tables.next_otp_id,
            email: email.to_string(),
            code: code.to_string(),
            created_at,
        };
        tables.otps.push(record.clone());
        record
    }

    /// Number of registered identities.
    pub async fn identity_count(&self) -> usize {
        self.tables.read().await.identities.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityWithPassword>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .identities
            .iter()
            .find(|row| row.identity.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.identities.iter().any(|row| row.identity.email == email))
    }

    async fn insert_identity(&self, new: &NewIdentity) -> Result<Identity, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .identities
            .iter()
            .any(|row| row.identity.email == new.email)
        {
            return Err(StoreError::Conflict);
        }
        tables.next_identity_id += 1;
        let identity = Identity {
            id: tables.next_identity_id,
            email: new.email.clone(),
            full_name: new.full_name.clone(),
        };
        tables.identities.push(IdentityWithPassword {
            identity: identity.clone(),
            password_hash: new.password_hash.clone(),
        });
        Ok(identity)
    }

    async fn insert_otp(&self, email: &str, code: &str) -> Result<OtpRecord, StoreError> {
        Ok(self.insert_otp_at(email, code, Utc::now()).await)
    }

    async fn otps_for_email(&self, email: &str) -> Result<Vec<OtpRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut records: Vec<OtpRecord> = tables
            .otps
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn delete_otps_for_email(&self, email: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.otps.len();
        tables.otps.retain(|r| r.email != email);
        Ok((before - tables.otps.len()) as u64)
    }
}

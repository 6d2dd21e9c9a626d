//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{CredentialStore, StoreError};
use crate::models::auth::{Identity, IdentityWithPassword, NewIdentity, OtpRecord};

/// Credential store over a `users` / `otp_codes` schema.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, (i64, String, Option<String>, String)>(
            "SELECT id, email, full_name, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, email, full_name, password_hash)| IdentityWithPassword {
            identity: Identity {
                id,
                email,
                full_name,
            },
            password_hash,
        }))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_identity(&self, new: &NewIdentity) -> Result<Identity, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (email, full_name, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&new.email)
        .bind(new.full_name.as_deref())
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(Identity {
            id,
            email: new.email.clone(),
            full_name: new.full_name.clone(),
        })
    }

    async fn insert_otp(&self, email: &str, code: &str) -> Result<OtpRecord, StoreError> {
        let (id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO otp_codes (email, code) VALUES ($1, $2) RETURNING id, created_at",
        )
        .bind(email)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(OtpRecord {
            id,
            email: email.to_string(),
            code: code.to_string(),
            created_at,
        })
    }

    async fn otps_for_email(&self, email: &str) -> Result<Vec<OtpRecord>, StoreError> {
        let rows = sqlx::query_as::<_, (i64, String, String, DateTime<Utc>)>(
            "SELECT id, email, code, created_at \
             FROM otp_codes \
             WHERE email = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, email, code, created_at)| OtpRecord {
                id,
                email,
                code,
                created_at,
            })
            .collect())
    }

    async fn delete_otps_for_email(&self, email: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

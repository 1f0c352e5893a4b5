/**
 * Verification Code Store
 *
 * Short-lived, single-use password reset codes. `consume` checks and deletes
 * in one store operation so a code can never be accepted twice.
 */

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::backend::error::StoreError;

/// Number of random bytes in a reset code
pub const CODE_BYTES: usize = 32;

/// A pending password reset code
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VerificationCode {
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// Generate a URL-safe reset code from 32 random bytes
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
pub trait VerificationCodeStore: Send + Sync {
    async fn insert(&self, code: &VerificationCode) -> Result<(), StoreError>;

    /// Delete the matching code if it was issued at or after `issued_after`
    ///
    /// # Returns
    /// `true` if a code was consumed
    async fn consume(
        &self,
        email: &str,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Drop codes created before `before`; returns the number removed
    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// PostgreSQL-backed code store
#[derive(Debug, Clone)]
pub struct PgVerificationCodeStore {
    pool: PgPool,
}

impl PgVerificationCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationCodeStore for PgVerificationCodeStore {
    async fn insert(&self, code: &VerificationCode) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO verification_codes (email, code, created_at) VALUES ($1, $2, $3)")
            .bind(&code.email)
            .bind(&code.code)
            .bind(code.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM verification_codes WHERE email = $1 AND code = $2 AND created_at >= $3",
        )
        .bind(email)
        .bind(code)
        .bind(issued_after)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE created_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// In-memory code store
#[derive(Debug, Default)]
pub struct MemoryVerificationCodeStore {
    codes: Mutex<Vec<VerificationCode>>,
}

impl MemoryVerificationCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationCodeStore for MemoryVerificationCodeStore {
    async fn insert(&self, code: &VerificationCode) -> Result<(), StoreError> {
        self.codes.lock().await.push(code.clone());
        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut codes = self.codes.lock().await;
        let position = codes
            .iter()
            .position(|c| c.email == email && c.code == code && c.created_at >= issued_after);
        match position {
            Some(index) => {
                codes.swap_remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut codes = self.codes.lock().await;
        let initial = codes.len();
        codes.retain(|c| c.created_at >= before);
        Ok((initial - codes.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code(email: &str, value: &str, created_at: DateTime<Utc>) -> VerificationCode {
        VerificationCode {
            email: email.to_string(),
            code: value.to_string(),
            created_at,
        }
    }

    #[test]
    fn test_generate_code_shape() {
        let first = generate_code();
        let second = generate_code();
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(first.len(), 43);
        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_code_consumed_once() {
        let store = MemoryVerificationCodeStore::new();
        let now = Utc::now();
        store.insert(&code("ana@x.com", "abc", now)).await.unwrap();

        let cutoff = now - Duration::minutes(15);
        assert!(!store.consume("bob@x.com", "abc", cutoff).await.unwrap());
        assert!(store.consume("ana@x.com", "abc", cutoff).await.unwrap());
        assert!(!store.consume("ana@x.com", "abc", cutoff).await.unwrap());
    }

    #[tokio::test]
    async fn test_old_code_rejected() {
        let store = MemoryVerificationCodeStore::new();
        let now = Utc::now();
        store
            .insert(&code("ana@x.com", "old", now - Duration::minutes(16)))
            .await
            .unwrap();

        assert!(!store.consume("ana@x.com", "old", now - Duration::minutes(15)).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let store = MemoryVerificationCodeStore::new();
        let now = Utc::now();
        store.insert(&code("a@x.com", "old", now - Duration::minutes(30))).await.unwrap();
        store.insert(&code("b@x.com", "new", now)).await.unwrap();

        assert_eq!(store.delete_expired(now - Duration::minutes(15)).await.unwrap(), 1);
        assert!(store.consume("b@x.com", "new", now - Duration::minutes(15)).await.unwrap());
    }
}

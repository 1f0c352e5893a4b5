/**
 * Token Store
 *
 * Every issued access and refresh token is persisted with its expiry and an
 * `is_active` flag. A record goes from active to inactive exactly once:
 * `deactivate` only succeeds while the record is still active, and that
 * guarded update is what makes refresh rotation single-use.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::error::StoreError;

/// Which of the two token tables a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn table(self) -> &'static str {
        match self {
            Self::Access => "access_tokens",
            Self::Refresh => "refresh_tokens",
        }
    }
}

/// Persisted token record
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TokenRecord {
    /// The signed token string (primary key)
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl TokenRecord {
    pub fn new(token: String, user_id: Uuid, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            created_at,
            expires_at,
            is_active: true,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Persistence for issued tokens
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, kind: TokenKind, record: &TokenRecord) -> Result<(), StoreError>;

    async fn find(&self, kind: TokenKind, token: &str) -> Result<Option<TokenRecord>, StoreError>;

    /// Deactivate a record only if it is still active
    ///
    /// # Returns
    /// `true` if this call performed the transition, `false` if the record is
    /// missing or was already inactive
    async fn deactivate(&self, kind: TokenKind, token: &str) -> Result<bool, StoreError>;

    /// Deactivate every active access and refresh token of a user
    ///
    /// # Returns
    /// Number of records deactivated
    async fn deactivate_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

/// PostgreSQL-backed token store
#[derive(Debug, Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, kind: TokenKind, record: &TokenRecord) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO {} (token, user_id, created_at, expires_at, is_active) VALUES ($1, $2, $3, $4, $5)",
            kind.table()
        ))
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, kind: TokenKind, token: &str) -> Result<Option<TokenRecord>, StoreError> {
        let record = sqlx::query_as::<_, TokenRecord>(&format!(
            "SELECT token, user_id, created_at, expires_at, is_active FROM {} WHERE token = $1",
            kind.table()
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn deactivate(&self, kind: TokenKind, token: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET is_active = FALSE WHERE token = $1 AND is_active = TRUE",
            kind.table()
        ))
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn deactivate_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut total = 0;
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let result = sqlx::query(&format!(
                "UPDATE {} SET is_active = FALSE WHERE user_id = $1 AND is_active = TRUE",
                kind.table()
            ))
            .bind(user_id)
            .execute(&self.pool)
            .await?;
            total += result.rows_affected();
        }

        Ok(total)
    }
}

/// In-memory token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: Mutex<HashMap<(TokenKind, String), TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(&self, kind: TokenKind, record: &TokenRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let key = (kind, record.token.clone());
        if records.contains_key(&key) {
            return Err(StoreError::Conflict(format!("{}_pkey", kind.table())));
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn find(&self, kind: TokenKind, token: &str) -> Result<Option<TokenRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.get(&(kind, token.to_string())).cloned())
    }

    async fn deactivate(&self, kind: TokenKind, token: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        match records.get_mut(&(kind, token.to_string())) {
            Some(record) if record.is_active => {
                record.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn deactivate_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut records = self.records.lock().await;
        let mut count = 0;
        for record in records.values_mut() {
            if record.user_id == user_id && record.is_active {
                record.is_active = false;
                count += 1;
            }
        }
        Ok(count)
    }
}

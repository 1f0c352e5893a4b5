/**
 * User Model and Credential Store
 *
 * This module defines the user record and the `UserStore` trait, with a
 * PostgreSQL implementation and an in-memory one for development and tests.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::error::StoreError;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// First name
    pub name: String,
    /// Surname
    pub surname: String,
    /// User email address (unique, case-sensitive as stored)
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh user with a new UUID v4
    pub fn new(name: String, surname: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            surname,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persistence for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user
    ///
    /// # Errors
    /// `StoreError::Conflict` if the email is already registered
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Replace name, surname and email
    ///
    /// # Returns
    /// The updated user, or `None` if no user has this id
    ///
    /// # Errors
    /// `StoreError::Conflict` if the email belongs to another user
    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        surname: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Replace the password hash; `false` if no user has this id
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;

    /// Replace the password hash by email; `false` if no user has this email
    async fn set_password_hash_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError>;
}

const USER_COLUMNS: &str = "id, name, surname, email, password_hash, created_at, updated_at";

/// PostgreSQL-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, surname, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        surname: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $1, surname = $2, email = $3, updated_at = $4
            WHERE id = $5
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(name)
        .bind(surname)
        .bind(email)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_password_hash_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE email = $3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// In-memory user store
///
/// Email uniqueness is checked under the write lock.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        surname: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        Ok(users.get_mut(&id).map(|user| {
            user.name = name.to_string();
            user.surname = surname.to_string();
            user.email = email.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_password_hash_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.values_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/**
 * Session Manager
 *
 * This module implements the account and session operations: signup,
 * login, refresh rotation, logout, profile update and password change.
 *
 * # Token Lifecycle
 *
 * Login, refresh and profile update each mint an access/refresh pair. Both
 * tokens are persisted as active records keyed by the signed string. A
 * refresh token is single-use: rotation deactivates it with a guarded
 * update, and only the caller that performs that transition receives a new
 * pair.
 */

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::backend::auth::error::AuthError;
use crate::backend::auth::password::PasswordHasher;
use crate::backend::auth::sessions::{Claims, Principal, TokenCodec};
use crate::backend::auth::tokens::{TokenKind, TokenRecord, TokenStore};
use crate::backend::auth::users::{User, UserStore};
use crate::backend::auth::validation::{password_problems, validate_identity, FieldError};
use crate::backend::error::StoreError;
use crate::backend::server::config::AuthConfig;

/// A freshly minted access/refresh token pair
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Account and session operations
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
    config: Arc<AuthConfig>,
    /// Hash checked when the email is unknown, at the configured cost
    dummy_hash: Arc<str>,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        config: Arc<AuthConfig>,
    ) -> Self {
        let hasher = PasswordHasher::new(config.bcrypt_cost);
        let dummy_hash = hasher.hash("lesionscan-unknown-account").unwrap_or_else(|e| {
            tracing::warn!("Failed to prepare the unknown-account hash: {}", e);
            String::new()
        });
        Self {
            users,
            tokens,
            hasher,
            codec: TokenCodec::new(config.jwt_secret.as_bytes(), config.jwt_algorithm),
            config,
            dummy_hash: dummy_hash.into(),
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Register a new account
    ///
    /// # Errors
    /// - `ValidationFailed` for bad name, surname, email or password
    /// - `DuplicateEmail` if the email is already registered
    pub async fn signup(
        &self,
        name: &str,
        surname: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let mut problems = validate_identity(name, surname, email);
        problems.extend(
            password_problems(password)
                .into_iter()
                .map(|message| FieldError::new("password", message)),
        );
        if !problems.is_empty() {
            return Err(AuthError::ValidationFailed(problems));
        }

        if self.users.find_by_email(email).await?.is_some() {
            tracing::warn!("Signup rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(password)?;
        let user = User::new(
            name.trim().to_string(),
            surname.trim().to_string(),
            email.to_string(),
            password_hash,
        );

        // The unique index still decides if two signups race
        match self.users.insert(&user).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(AuthError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }

        tracing::info!("User created: {}", user.id);
        Ok(user)
    }

    /// Verify credentials and start a session
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email or a wrong password
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                // Same bcrypt work as a wrong password
                self.hasher.verify(password, &self.dummy_hash);
                tracing::warn!("Login failed: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::warn!("Login failed: wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issue_pair(&user).await?;
        tracing::info!("User logged in: {}", user.id);
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The presented token is deactivated before the new pair is minted. If
    /// minting fails afterwards the session is gone and the user logs in
    /// again.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let record = self
            .tokens
            .find(TokenKind::Refresh, refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken("Invalid refresh token"))?;

        if record.is_expired_at(Utc::now()) {
            self.tokens.deactivate(TokenKind::Refresh, refresh_token).await?;
            return Err(AuthError::TokenExpired);
        }
        if !record.is_active {
            return Err(AuthError::TokenInactive);
        }

        if !self.tokens.deactivate(TokenKind::Refresh, refresh_token).await? {
            tracing::warn!("Refresh token for user {} was rotated concurrently", record.user_id);
            return Err(AuthError::TokenInactive);
        }

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let pair = self.issue_pair(&user).await?;
        tracing::info!("Refresh token rotated for user {}", user.id);
        Ok(pair)
    }

    /// Change name, surname and email, and mint a pair carrying the new values
    pub async fn update_profile(
        &self,
        principal: &Principal,
        name: &str,
        surname: &str,
        email: &str,
    ) -> Result<TokenPair, AuthError> {
        let problems = validate_identity(name, surname, email);
        if !problems.is_empty() {
            return Err(AuthError::ValidationFailed(problems));
        }

        let user = match self
            .users
            .update_profile(principal.user_id, name.trim(), surname.trim(), email)
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthError::UserNotFound),
            Err(StoreError::Conflict(_)) => return Err(AuthError::EmailInUse),
            Err(e) => return Err(e.into()),
        };

        if self.config.revoke_sessions_on_profile_update {
            let revoked = self.tokens.deactivate_all_for_user(user.id).await?;
            tracing::info!("Revoked {} tokens after profile update of user {}", revoked, user.id);
        }

        let pair = self.issue_pair(&user).await?;
        tracing::info!("Profile updated for user {}", user.id);
        Ok(pair)
    }

    /// Replace the password of the authenticated user
    ///
    /// Checks run in this order: user exists, old password correct, new
    /// passwords match, new differs from current, new meets the policy.
    pub async fn change_password(
        &self,
        principal: &Principal,
        old_password: &str,
        new_password: &str,
        confirm_new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_id(principal.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.hasher.verify(old_password, &user.password_hash) {
            return Err(AuthError::IncorrectOldPassword);
        }
        if new_password != confirm_new_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.hasher.verify(new_password, &user.password_hash) {
            return Err(AuthError::PasswordUnchanged);
        }
        let problems = password_problems(new_password);
        if !problems.is_empty() {
            return Err(AuthError::WeakPassword(problems));
        }

        let password_hash = self.hasher.hash(new_password)?;
        if !self.users.set_password_hash(user.id, &password_hash).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!("Password changed for user {}", user.id);
        Ok(())
    }

    /// Deactivate both tokens of a session
    ///
    /// Never fails: unknown tokens and store errors are only logged.
    pub async fn logout(&self, access_token: &str, refresh_token: &str) {
        for (kind, token) in [(TokenKind::Access, access_token), (TokenKind::Refresh, refresh_token)] {
            match self.tokens.deactivate(kind, token).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!("Logout: {:?} token not found or already inactive", kind),
                Err(e) => tracing::warn!("Logout: failed to deactivate {:?} token: {}", kind, e),
            }
        }
    }

    /// Mint and persist an access/refresh pair for a user
    pub async fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let now = Utc::now();

        let access_claims = Claims::new(&user.email, user.id).with_name(&user.name);
        let access_token = self
            .mint(TokenKind::Access, user, access_claims, now, self.config.access_token_ttl)
            .await?;

        let refresh_claims = Claims::new(&user.email, user.id);
        let refresh_token = self
            .mint(TokenKind::Refresh, user, refresh_claims, now, self.config.refresh_token_ttl)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn mint(
        &self,
        kind: TokenKind,
        user: &User,
        claims: Claims,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<String, AuthError> {
        let (token, expires_at) = self
            .codec
            .sign(claims, now, ttl)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.tokens
            .insert(kind, &TokenRecord::new(token.clone(), user.id, now, expires_at))
            .await?;

        Ok(token)
    }
}

/**
 * Password Reset Flow
 *
 * Request: generate a single-use code, persist it and email a reset link.
 * Confirm: consume the code within the reset window and set the new password.
 */

use std::sync::Arc;

use chrono::Utc;

use crate::backend::auth::error::AuthError;
use crate::backend::auth::password::PasswordHasher;
use crate::backend::auth::users::UserStore;
use crate::backend::auth::validation::password_problems;
use crate::backend::auth::verification::{generate_code, VerificationCode, VerificationCodeStore};
use crate::backend::mail::Mailer;
use crate::backend::server::config::AuthConfig;

pub const RESET_EMAIL_SUBJECT: &str = "Password Reset Request";

#[derive(Clone)]
pub struct PasswordResetFlow {
    users: Arc<dyn UserStore>,
    codes: Arc<dyn VerificationCodeStore>,
    mailer: Arc<dyn Mailer>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl PasswordResetFlow {
    pub fn new(
        users: Arc<dyn UserStore>,
        codes: Arc<dyn VerificationCodeStore>,
        mailer: Arc<dyn Mailer>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            users,
            codes,
            mailer,
            hasher: PasswordHasher::new(config.bcrypt_cost),
            config,
        }
    }

    pub fn codes(&self) -> &Arc<dyn VerificationCodeStore> {
        &self.codes
    }

    /// Build the link the user follows to reset their password
    pub fn reset_link(&self, code: &str, email: &str) -> String {
        format!(
            "{}?token={}&email={}",
            self.config.reset_link_base,
            urlencoding::encode(code),
            urlencoding::encode(email)
        )
    }

    /// Issue a reset code and email the link
    ///
    /// # Errors
    /// - `UserNotFound` if no account has this email
    /// - `NotificationFailed` if the email could not be sent; the code stays
    ///   stored and expires on its own
    pub async fn request_reset(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let code = VerificationCode {
            email: user.email.clone(),
            code: generate_code(),
            created_at: Utc::now(),
        };
        self.codes.insert(&code).await?;

        let link = self.reset_link(&code.code, &user.email);
        let body = format!(
            "Hello {},\n\nClick the link below to reset your password:\n{}\n\nThe link expires in {} minutes.",
            user.name,
            link,
            self.config.reset_code_ttl.num_minutes()
        );

        self.mailer
            .send(&user.email, RESET_EMAIL_SUBJECT, &body)
            .await
            .map_err(|e| {
                tracing::error!("Failed to send reset email to user {}: {}", user.id, e);
                AuthError::NotificationFailed(e)
            })?;

        tracing::info!("Password reset requested for user {}", user.id);
        Ok(())
    }

    /// Consume a reset code and set the new password
    ///
    /// The password policy is checked before the code is touched, so a weak
    /// password does not burn the code.
    pub async fn confirm_reset(&self, email: &str, code: &str, new_password: &str) -> Result<(), AuthError> {
        let problems = password_problems(new_password);
        if !problems.is_empty() {
            return Err(AuthError::WeakPassword(problems));
        }

        let issued_after = Utc::now() - self.config.reset_code_ttl;
        if !self.codes.consume(email, code, issued_after).await? {
            tracing::warn!("Password reset rejected: invalid or expired code");
            return Err(AuthError::InvalidOrExpiredCode);
        }

        let password_hash = self.hasher.hash(new_password)?;
        if !self.users.set_password_hash_by_email(email, &password_hash).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!("Password reset completed");
        Ok(())
    }
}

/**
 * Authentication Errors
 *
 * Every failure the session manager, the password reset flow and the auth
 * middleware can report. The HTTP status for each variant is decided in
 * `backend::error::types`.
 */

use thiserror::Error;

use crate::backend::auth::validation::FieldError;
use crate::backend::error::StoreError;
use crate::backend::mail::MailError;

/// Authentication and session errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more fields failed validation
    #[error("Validation failed")]
    ValidationFailed(Vec<FieldError>),

    /// Signup with an email that is already registered
    #[error("Email already registered")]
    DuplicateEmail,

    /// Profile update to an email owned by another user
    #[error("Email already in use")]
    EmailInUse,

    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is malformed, unknown or missing required claims
    #[error("{0}")]
    InvalidToken(&'static str),

    #[error("Token expired")]
    TokenExpired,

    #[error("Inactive token")]
    TokenInactive,

    /// Reset code is unknown, already used or older than the reset window
    #[error("Invalid or expired token.")]
    InvalidOrExpiredCode,

    #[error("Old password is incorrect")]
    IncorrectOldPassword,

    #[error("New passwords do not match")]
    PasswordMismatch,

    #[error("New password must be different from the old password")]
    PasswordUnchanged,

    /// New password violates the password policy
    #[error("Password does not meet the requirements")]
    WeakPassword(Vec<String>),

    #[error("User not found")]
    UserNotFound,

    /// The reset email could not be delivered; the transport error is logged, not shown
    #[error("Failed to send password reset email")]
    NotificationFailed(#[source] MailError),

    /// Store, hashing or signing fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "VALIDATION_ERROR",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::EmailInUse => "EMAIL_IN_USE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInactive => "TOKEN_INACTIVE",
            Self::InvalidOrExpiredCode => "INVALID_OR_EXPIRED_CODE",
            Self::IncorrectOldPassword => "INCORRECT_OLD_PASSWORD",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::PasswordUnchanged => "PASSWORD_UNCHANGED",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotificationFailed(_) => "NOTIFICATION_FAILED",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Internal(format!("password hashing failed: {}", err))
    }
}

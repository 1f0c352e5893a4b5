/**
 * Backend Error Types
 *
 * This module defines the HTTP-facing error enum and the persistence error
 * shared by every store implementation.
 *
 * # Status Code Mapping
 *
 * - 400 - validation and business-rule violations
 * - 401 - authentication failures (credentials, tokens)
 * - 404 - missing users, reports and routes
 * - 422 - request-shape failures (malformed JSON or multipart bodies)
 * - 500 - unanticipated faults
 * - 502 / 503 - the email relay or detection service failing or missing
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::error::AuthError;
use crate::backend::detection::DetectionError;
use crate::backend::reports::ReportError;

/// Persistence error returned by every store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. duplicate email)
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return Self::Conflict(constraint);
            }
        }
        Self::Database(err)
    }
}

/// Backend-specific error types
///
/// Every handler returns `Result<_, BackendError>`. Domain errors convert in
/// through `From`, and `status_code` / `error_code` are the only place where
/// they are mapped onto HTTP.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Authentication and session failures
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Report storage failures
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Detection service failures
    #[error(transparent)]
    Detection(#[from] DetectionError),

    /// The request body did not have the expected shape
    #[error("Validation Error")]
    RequestShape {
        /// One entry per problem, `{"loc", "msg", "type"}`
        details: Vec<serde_json::Value>,
    },

    /// Handler error with an explicit status (e.g. unknown route)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a request-shape error for a single location
    pub fn request_shape(loc: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self::RequestShape {
            details: vec![serde_json::json!({
                "loc": ["body", loc],
                "msg": msg.into(),
                "type": kind,
            })],
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::ValidationFailed(_)
                | AuthError::DuplicateEmail
                | AuthError::EmailInUse
                | AuthError::InvalidOrExpiredCode
                | AuthError::IncorrectOldPassword
                | AuthError::PasswordMismatch
                | AuthError::PasswordUnchanged
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::InvalidToken(_)
                | AuthError::TokenExpired
                | AuthError::TokenInactive => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::NotificationFailed(_) => StatusCode::BAD_GATEWAY,
                AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Report(err) => match err {
                ReportError::NotFound => StatusCode::NOT_FOUND,
                ReportError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
                ReportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Detection(err) => match err {
                DetectionError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                DetectionError::EmptyImage => StatusCode::BAD_REQUEST,
                DetectionError::Upstream(_) => StatusCode::BAD_GATEWAY,
            },
            Self::RequestShape { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::HandlerError { status, .. } => *status,
        }
    }

    /// Stable machine-readable code for the error envelope
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(err) => err.error_code(),
            Self::Report(err) => match err {
                ReportError::NotFound => "REPORT_NOT_FOUND",
                ReportError::InvalidUpload(_) => "INVALID_UPLOAD",
                ReportError::Internal(_) => "INTERNAL_SERVER_ERROR",
            },
            Self::Detection(err) => match err {
                DetectionError::Unavailable => "DETECTOR_UNAVAILABLE",
                DetectionError::EmptyImage => "INVALID_UPLOAD",
                DetectionError::Upstream(_) => "DETECTOR_FAILED",
            },
            Self::RequestShape { .. } => "VALIDATION_ERROR",
            Self::HandlerError { .. } => "HTTP_EXCEPTION",
        }
    }

    /// Message shown to the client
    ///
    /// Server-side faults never echo their internal description.
    pub fn message(&self) -> String {
        if self.status_code().is_server_error() && !self.is_upstream() {
            return "Internal Server Error".to_string();
        }
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Field-level details, when the error carries any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Auth(AuthError::ValidationFailed(fields)) => serde_json::to_value(fields).ok(),
            Self::Auth(AuthError::WeakPassword(reasons)) => serde_json::to_value(reasons).ok(),
            Self::RequestShape { details } => Some(serde_json::Value::Array(details.clone())),
            _ => None,
        }
    }

    fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::NotificationFailed(_))
                | Self::Detection(DetectionError::Unavailable)
                | Self::Detection(DetectionError::Upstream(_))
        )
    }
}

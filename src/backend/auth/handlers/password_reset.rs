/**
 * Password Reset Handlers
 *
 * POST /api/auth/request-password-reset emails a single-use reset link.
 * POST /api/auth/reset-password consumes the code and sets the new password.
 */

use axum::extract::State;

use crate::backend::auth::handlers::types::{PasswordResetRequest, ResetPasswordRequest};
use crate::backend::auth::reset::PasswordResetFlow;
use crate::backend::error::BackendError;
use crate::backend::response::{ApiJson, ApiResponse};

/// Request a password reset email
///
/// # Errors
///
/// * `404 USER_NOT_FOUND` - No account has this email
/// * `502 NOTIFICATION_FAILED` - The email could not be delivered
pub async fn request_password_reset(
    State(resets): State<PasswordResetFlow>,
    ApiJson(request): ApiJson<PasswordResetRequest>,
) -> Result<ApiResponse<()>, BackendError> {
    resets.request_reset(&request.email).await?;
    Ok(ApiResponse::message("Password reset email sent"))
}

/// Confirm a password reset
///
/// # Errors
///
/// * `400 WEAK_PASSWORD` - New password violates the policy
/// * `400 INVALID_OR_EXPIRED_CODE` - Code unknown, used or older than the window
pub async fn reset_password(
    State(resets): State<PasswordResetFlow>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> Result<ApiResponse<()>, BackendError> {
    resets
        .confirm_reset(&request.email, &request.token, &request.new_password)
        .await?;
    Ok(ApiResponse::message("Password has been reset successfully"))
}

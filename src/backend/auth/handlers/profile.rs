/**
 * Profile Handlers
 *
 * Handlers for the authenticated user's own account: profile update,
 * password change and the protected greeting route.
 *
 * # Authentication
 *
 * Every handler here sits behind `auth_middleware` and receives the caller
 * through the `AuthUser` extractor.
 */

use axum::extract::State;

use crate::backend::auth::handlers::types::{ChangePasswordRequest, TokenResponse, UpdateProfileRequest};
use crate::backend::auth::service::SessionManager;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::response::{ApiJson, ApiResponse};

/// POST /api/auth/update-profile
///
/// Returns a new token pair whose claims carry the updated email and name.
///
/// # Errors
///
/// * `400 VALIDATION_ERROR` - Bad name, surname or email
/// * `400 EMAIL_IN_USE` - Email belongs to another account
/// * `404 USER_NOT_FOUND` - The account no longer exists
pub async fn update_profile(
    State(sessions): State<SessionManager>,
    AuthUser(principal): AuthUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<ApiResponse<TokenResponse>, BackendError> {
    let pair = sessions
        .update_profile(&principal, &request.name, &request.surname, &request.email)
        .await?;

    Ok(ApiResponse::data(TokenResponse::from(pair)).with_message("Profile updated successfully"))
}

/// POST /api/auth/change-password
///
/// # Errors
///
/// * `400 INCORRECT_OLD_PASSWORD`, `PASSWORD_MISMATCH`, `PASSWORD_UNCHANGED`,
///   `WEAK_PASSWORD` - checked in that order
/// * `404 USER_NOT_FOUND` - The account no longer exists
pub async fn change_password(
    State(sessions): State<SessionManager>,
    AuthUser(principal): AuthUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, BackendError> {
    sessions
        .change_password(
            &principal,
            &request.old_password,
            &request.new_password,
            &request.confirm_new_password,
        )
        .await?;

    Ok(ApiResponse::message("Password changed successfully"))
}

/// GET /api/auth/protected-route
pub async fn protected_route(AuthUser(principal): AuthUser) -> ApiResponse<()> {
    ApiResponse::message(format!("Hello {}!", principal.email))
}

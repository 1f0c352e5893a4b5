//! Token handlers: refresh rotation and logout.

use axum::extract::State;

use crate::backend::auth::handlers::types::{LogoutRequest, RefreshTokenRequest, TokenResponse};
use crate::backend::auth::service::SessionManager;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::response::{ApiJson, ApiResponse};

/// POST /api/auth/refresh-token
///
/// The presented refresh token is spent; the response carries the only
/// tokens that remain valid for the session.
///
/// # Errors
///
/// * `401 INVALID_TOKEN` - Unknown refresh token
/// * `401 TOKEN_EXPIRED` - Refresh token past its expiry
/// * `401 TOKEN_INACTIVE` - Refresh token already used or logged out
pub async fn refresh_token(
    State(sessions): State<SessionManager>,
    ApiJson(request): ApiJson<RefreshTokenRequest>,
) -> Result<ApiResponse<TokenResponse>, BackendError> {
    let pair = sessions.refresh(&request.refresh_token).await?;
    Ok(ApiResponse::data(TokenResponse::from(pair)).with_message("Token refreshed successfully"))
}

/// POST /api/auth/logout
///
/// Always succeeds once the caller is authenticated.
pub async fn logout(
    State(sessions): State<SessionManager>,
    AuthUser(principal): AuthUser,
    ApiJson(request): ApiJson<LogoutRequest>,
) -> Result<ApiResponse<()>, BackendError> {
    sessions.logout(&request.access_token, &request.refresh_token).await;
    tracing::info!("User logged out: {}", principal.user_id);
    Ok(ApiResponse::message("Logout successful"))
}

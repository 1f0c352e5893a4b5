/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Mint and persist an access token and a refresh token
 *
 * # Security
 *
 * - Unknown emails and wrong passwords return the same 401 response
 * - Passwords are never logged or returned in responses
 */

use axum::extract::State;

use crate::backend::auth::handlers::types::{LoginRequest, TokenResponse};
use crate::backend::auth::service::SessionManager;
use crate::backend::error::BackendError;
use crate::backend::response::{ApiJson, ApiResponse};

/// Login handler
///
/// # Errors
///
/// * `401 INVALID_CREDENTIALS` - Unknown email or wrong password
/// * `500` - Store or signing failure
///
/// # Example Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Login successful",
///   "data": {
///     "access_token": "eyJhbGciOiJIUzI1NiIs...",
///     "refresh_token": "eyJhbGciOiJIUzI1NiIs...",
///     "token_type": "bearer"
///   }
/// }
/// ```
pub async fn login(
    State(sessions): State<SessionManager>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<ApiResponse<TokenResponse>, BackendError> {
    let pair = sessions.login(&request.email, &request.password).await?;
    Ok(ApiResponse::data(TokenResponse::from(pair)).with_message("Login successful"))
}

/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate name, surname, email and password
 * 2. Reject emails that are already registered
 * 3. Hash the password with bcrypt and store the user
 * 4. Return the public profile (no tokens; the client logs in next)
 */

use axum::extract::State;

use crate::backend::auth::handlers::types::{SignupRequest, UserResponse};
use crate::backend::auth::service::SessionManager;
use crate::backend::error::BackendError;
use crate::backend::response::{ApiJson, ApiResponse};

/// Signup handler
///
/// # Errors
///
/// * `400 VALIDATION_ERROR` - A field failed validation (`details` lists them)
/// * `400 DUPLICATE_EMAIL` - The email is already registered
/// * `422 VALIDATION_ERROR` - The body is not valid JSON or misses a field
///
/// # Example Request
///
/// ```http
/// POST /api/auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// {"name": "Ana", "surname": "Smith", "email": "ana@x.com", "password": "Str0ng!Pass"}
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "success": true,
///   "message": "User created successfully",
///   "data": {"id": "0b6f...", "email": "ana@x.com", "name": "Ana", "surname": "Smith"}
/// }
/// ```
pub async fn signup(
    State(sessions): State<SessionManager>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<ApiResponse<UserResponse>, BackendError> {
    tracing::info!("Signup request received");

    let user = sessions
        .signup(&request.name, &request.surname, &request.email, &request.password)
        .await?;

    Ok(ApiResponse::data(UserResponse::from(user)).with_message("User created successfully"))
}

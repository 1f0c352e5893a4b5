/**
 * Authentication Handler Types
 *
 * This module defines the request and response bodies of the
 * `/api/auth` endpoints.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::service::TokenPair;
use crate::backend::auth::users::User;

/// Sign up request
#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    /// Plaintext password (hashed before storage, never logged)
    pub password: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Logout request; both tokens of the session
#[derive(Deserialize, Serialize, Debug)]
pub struct LogoutRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Reset confirmation; `token` is the code from the emailed link
#[derive(Deserialize, Serialize, Debug)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

/// User response (without sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserResponse {
    /// User's unique ID (UUID)
    pub id: String,
    pub email: String,
    pub name: String,
    pub surname: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            surname: user.surname,
        }
    }
}

/// Token pair response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"bearer"`
    pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

//! Authentication Module
//!
//! This module handles user registration, credential login, dual-token
//! sessions and password reset.
//!
//! # Architecture
//!
//! The auth module is organized into focused submodules, leaves first:
//!
//! - **`users`** - User model and credential store
//! - **`tokens`** - Access/refresh token records and token store
//! - **`verification`** - Password reset codes and their store
//! - **`password`** - bcrypt hashing and verification
//! - **`sessions`** - JWT claims and the token codec
//! - **`validation`** - Name, email and password policy
//! - **`service`** - `SessionManager`: signup, login, refresh, logout,
//!   profile update, password change
//! - **`reset`** - `PasswordResetFlow`: request and confirm a reset
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── error.rs        - AuthError
//! ├── users.rs        - User model and UserStore
//! ├── tokens.rs       - TokenRecord and TokenStore
//! ├── verification.rs - VerificationCode and VerificationCodeStore
//! ├── password.rs     - PasswordHasher
//! ├── sessions.rs     - Claims, TokenCodec, Principal
//! ├── validation.rs   - Field validation
//! ├── service.rs      - SessionManager
//! ├── reset.rs        - PasswordResetFlow
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: name, surname, email, password → validated → user stored
//! 2. **Login**: email + password → access token (minutes) + refresh token (days)
//! 3. **Protected request**: bearer access token → signature, claims and the
//!    stored record are all checked by `middleware::auth`
//! 4. **Refresh**: refresh token → deactivated once → new pair
//! 5. **Logout**: both tokens deactivated
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Every issued token is persisted so it can be revoked before it expires
//! - Refresh tokens are single-use
//! - Invalid credentials return 401 (no information leakage)

/// Authentication error type
pub mod error;

/// User data model and credential store
pub mod users;

/// Token records and token store
pub mod tokens;

/// Password reset codes
pub mod verification;

/// Password hashing
pub mod password;

/// JWT claims and codec
pub mod sessions;

/// Field validation
pub mod validation;

/// Session manager
pub mod service;

/// Password reset flow
pub mod reset;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types
pub use error::AuthError;
pub use reset::PasswordResetFlow;
pub use service::{SessionManager, TokenPair};
pub use sessions::{Claims, Principal, TokenCodec};

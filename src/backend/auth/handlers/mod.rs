//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for the `/api/auth` endpoints.
//! Handlers are thin: they extract the body and the caller, delegate to
//! `SessionManager` or `PasswordResetFlow`, and wrap the result in the
//! success envelope. Failures convert into `BackendError`.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs            - Module exports and documentation
//! ├── types.rs          - Request and response types
//! ├── signup.rs         - User registration
//! ├── login.rs          - Credential login
//! ├── tokens.rs         - Refresh rotation and logout
//! ├── profile.rs        - Profile update, password change, protected route
//! └── password_reset.rs - Reset request and confirmation
//! ```
//!
//! # Handlers
//!
//! Public:
//! - **`signup`** - POST /api/auth/signup
//! - **`login`** - POST /api/auth/login
//! - **`refresh_token`** - POST /api/auth/refresh-token
//! - **`request_password_reset`** - POST /api/auth/request-password-reset
//! - **`reset_password`** - POST /api/auth/reset-password
//!
//! Bearer token required:
//! - **`update_profile`** - POST /api/auth/update-profile
//! - **`change_password`** - POST /api/auth/change-password
//! - **`logout`** - POST /api/auth/logout
//! - **`protected_route`** - GET /api/auth/protected-route

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Refresh and logout handlers
pub mod tokens;

/// Authenticated account handlers
pub mod profile;

/// Password reset handlers
pub mod password_reset;

// Re-export commonly used types
pub use types::{LoginRequest, SignupRequest, TokenResponse, UserResponse};

// Re-export handlers
pub use login::login;
pub use password_reset::{request_password_reset, reset_password};
pub use profile::{change_password, protected_route, update_profile};
pub use signup::signup;
pub use tokens::{logout, refresh_token};

//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, layers, fallback
//! └── api_routes.rs   - /api/auth, /api/reports and /detect
//! ```
//!
//! # Route Types
//!
//! ## Public
//!
//! - `GET /` - Welcome message
//! - `POST /api/auth/signup`, `POST /api/auth/login`
//! - `POST /api/auth/refresh-token`
//! - `POST /api/auth/request-password-reset`, `POST /api/auth/reset-password`
//! - `POST /detect` - Lesion detection
//! - `GET /static/*` - Static files
//!
//! ## Bearer token required
//!
//! - `POST /api/auth/update-profile`, `POST /api/auth/change-password`
//! - `POST /api/auth/logout`, `GET /api/auth/protected-route`
//! - `POST /api/reports/upload`, `GET /api/reports/me`
//! - `GET /api/reports/pdf/{id}`, `GET /api/reports/image/{id}`
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lesionscan::backend::mail::LogMailer;
//! use lesionscan::backend::routes::create_router;
//! use lesionscan::backend::server::{AppState, AuthConfig, Stores};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = AuthConfig::from_env()?;
//! let state = AppState::new(Stores::in_memory(), auth, Arc::new(LogMailer), None);
//! let router = create_router(state, "static");
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;

//! LesionScan - Main Library
//!
//! LesionScan is the backend of a skin-lesion screening application. It
//! authenticates users, forwards uploaded images to an object-detection
//! service, and keeps per-user screening reports (image, PDF and diagnosis
//! metadata).
//!
//! # Overview
//!
//! The heart of the crate is the authentication subsystem:
//! - Dual-token sessions (short-lived access token, long-lived refresh token)
//! - Single-use refresh token rotation
//! - Server-side revocation on top of signed JWTs
//! - Verification-code based password reset over email
//!
//! # Module Structure
//!
//! - **`backend`** - Axum HTTP server, stores, services and handlers
//!   - `auth` - credential/token/code stores, hasher, token codec, session manager
//!   - `middleware` - bearer token verification for protected routes
//!   - `reports` - report persistence and blob storage
//!   - `detection` - lesion detection endpoint and label catalogue
//!   - `mail` - outbound email
//!   - `error` - central error type and HTTP mapping
//!   - `server` / `routes` - configuration, state and router assembly
//!
//! # Usage
//!
//! ```rust,no_run
//! use lesionscan::backend::server::{config::ServerConfig, init::create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await?;
//! // Serve `app` with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `Result<T, E>` with `thiserror` enums per layer
//! - `backend::error::BackendError` maps every failure to a status code and a
//!   JSON error envelope in one place

/// Backend server-side code
pub mod backend;

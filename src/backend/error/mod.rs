//! Backend Error Module
//!
//! This module defines the error types shared by the whole backend and the
//! single place where failures become HTTP responses.
//!
//! # Architecture
//!
//! - **`types`** - `BackendError` (HTTP-facing) and `StoreError` (persistence)
//! - **`conversion`** - `IntoResponse`, the error envelope and the middleware
//!   that stamps request details onto it
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions and status mapping
//! └── conversion.rs - Response rendering and rejection conversions
//! ```
//!
//! # Error Envelope
//!
//! ```json
//! {
//!   "success": false,
//!   "error": {
//!     "path": "/api/auth/login",
//!     "timestamp": "2026-01-01T12:00:00.000Z",
//!     "hostname": "127.0.0.1",
//!     "message": "Invalid credentials",
//!     "error_code": "INVALID_CREDENTIALS"
//!   }
//! }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use conversion::{error_envelope, ErrorPayload};
pub use types::{BackendError, StoreError};

//! Backend Module
//!
//! This module contains all server-side code for LesionScan: the Axum HTTP
//! server, the authentication core, report storage and the detection
//! endpoint.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Stores, password hashing, JWT codec, session and reset flows
//! - **`middleware`** - Bearer token verification for protected routes
//! - **`reports`** - Report metadata store, blob store and handlers
//! - **`detection`** - Detector client, lesion catalogue and handler
//! - **`mail`** - Outbound email delivery
//! - **`error`** - Backend error type, status mapping and error envelopes
//! - **`response`** - Success envelope and JSON extractor
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Configuration, state and initialization
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication core
//! ├── middleware/     - Request middleware
//! ├── reports/        - Screening reports
//! ├── detection/      - Lesion detection
//! ├── mail/           - Email delivery
//! ├── error/          - Error types
//! └── response.rs     - Response envelopes
//! ```
//!
//! # State Management
//!
//! Every store sits behind an async trait object (`Arc<dyn ...>`) so the same
//! services run on PostgreSQL or on the in-memory stores. `AppState` holds the
//! services and implements `FromRef` so handlers extract only what they use.
//!
//! # Error Handling
//!
//! Services return `Result<T, AuthError>` / `Result<T, ReportError>`; handlers
//! convert them into `BackendError`, which owns the status code mapping and
//! renders the `{"success": false, "error": {...}}` envelope.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Screening reports and blob storage
pub mod reports;

/// Lesion detection
pub mod detection;

/// Outbound email
pub mod mail;

/// Response envelopes and extractors
pub mod response;

/// Re-export commonly used types
pub use server::create_app;
pub use error::BackendError;
pub use server::state::AppState;

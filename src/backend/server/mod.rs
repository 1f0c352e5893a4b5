//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - `Stores`, `AppState` and `FromRef` implementations
//! - **`config`** - Configuration loading and validation
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - ServerConfig, AuthConfig, SmtpConfig, database loading
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env` reads every setting once
//! 2. **Stores**: PostgreSQL when `DATABASE_URL` is set, in-memory otherwise
//! 3. **Services**: session manager, reset flow, report service, detector
//! 4. **Background Tasks**: periodic purge of expired reset codes
//! 5. **Router Creation**: Configures all routes and middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use lesionscan::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{AuthConfig, ServerConfig};
pub use init::{create_app, StartupError};
pub use state::{AppState, Stores};

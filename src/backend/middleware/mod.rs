//! Middleware Module
//!
//! This module contains the HTTP middleware of the backend server.
//!
//! - **`auth`** - Bearer token verification for protected routes
//!
//! The error envelope middleware lives with the error types in
//! `backend::error::conversion`.
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use lesionscan::backend::auth::handlers::protected_route;
//! use lesionscan::backend::middleware::auth_middleware;
//! use lesionscan::backend::server::state::AppState;
//!
//! fn protected(state: AppState) -> Router<AppState> {
//!     Router::new()
//!         .route("/protected-route", get(protected_route))
//!         .route_layer(middleware::from_fn_with_state(state.sessions.clone(), auth_middleware))
//! }
//! ```

pub mod auth;

pub use auth::{auth_middleware, bearer_token, verify_access_token, AuthUser};

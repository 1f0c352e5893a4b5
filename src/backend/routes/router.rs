/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Welcome route (`GET /`)
 * 2. API routes (auth, reports, detection)
 * 3. Static files under `/static`
 * 4. Fallback handler (404 in the error envelope)
 *
 * # Layers
 *
 * From the inside out: `error_envelope` fills in the request path and
 * client address on error bodies, `CorsLayer` answers preflight requests
 * and `TraceLayer` opens a span per request.
 */

use std::path::Path;

use axum::{http::StatusCode, middleware::from_fn, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::backend::error::{error_envelope, BackendError};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to Skin Cancer Detection App!";

async fn welcome() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

async fn not_found() -> BackendError {
    BackendError::handler(StatusCode::NOT_FOUND, "Not Found")
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Services shared by the handlers
/// * `static_dir` - Directory served under `/static`
///
/// # Returns
///
/// Configured Axum Router ready to serve requests. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so error bodies
/// carry the client address.
pub fn create_router(app_state: AppState, static_dir: impl AsRef<Path>) -> Router<()> {
    let router = Router::new().route("/", get(welcome));

    // Add API routes
    let router = configure_api_routes(router, &app_state);

    // Add static file serving
    let router = router.nest_service("/static", ServeDir::new(static_dir.as_ref()));

    // Fallback handler for 404
    let router = router.fallback(not_found);

    router
        .layer(from_fn(error_envelope))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/**
 * API Route Handlers
 *
 * This module defines the route groups under `/api` and the detection
 * endpoint:
 *
 * ## Authentication (`/api/auth`)
 * - `POST /signup`, `POST /login`, `POST /refresh-token`,
 *   `POST /request-password-reset`, `POST /reset-password` - public
 * - `POST /update-profile`, `POST /change-password`, `POST /logout`,
 *   `GET /protected-route` - bearer token required
 *
 * ## Reports (`/api/reports`, bearer token required)
 * - `POST /upload`, `GET /me`, `GET /pdf/{id}`, `GET /image/{id}`
 *
 * ## Detection
 * - `POST /detect`
 */

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::backend::auth::handlers::{
    change_password, login, logout, protected_route, refresh_token, request_password_reset,
    reset_password, signup, update_profile,
};
use crate::backend::detection::handlers::detect_lesion;
use crate::backend::middleware::auth_middleware;
use crate::backend::reports::handlers::{download_pdf, get_image, my_reports, upload_report};
use crate::backend::server::state::AppState;

/// Largest accepted upload body (image plus PDF)
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Routes mounted under `/api/auth`
///
/// The protected group is wrapped in `auth_middleware` with `route_layer`,
/// so unknown paths still reach the fallback instead of answering 401.
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/update-profile", post(update_profile))
        .route("/change-password", post(change_password))
        .route("/logout", post(logout))
        .route("/protected-route", get(protected_route))
        .route_layer(from_fn_with_state(state.sessions.clone(), auth_middleware));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/request-password-reset", post(request_password_reset))
        .route("/reset-password", post(reset_password))
        .merge(protected)
}

/// Routes mounted under `/api/reports`; every route needs a bearer token
pub fn report_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_report))
        .route("/me", get(my_reports))
        .route("/pdf/{id}", get(download_pdf))
        .route("/image/{id}", get(get_image))
        .route_layer(from_fn_with_state(state.sessions.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Configure API routes
///
/// Adds the auth and report groups plus `POST /detect` to `router`.
pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .nest("/api/auth", auth_routes(state))
        .nest("/api/reports", report_routes(state))
        .route(
            "/detect",
            post(detect_lesion).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

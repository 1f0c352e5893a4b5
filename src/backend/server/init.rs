/**
 * Server Initialization
 *
 * This module builds the application from a `ServerConfig`: stores,
 * services, background tasks and the router.
 *
 * # Initialization Process
 *
 * 1. Connect to PostgreSQL and run migrations, or fall back to in-memory
 *    stores when `DATABASE_URL` is unset
 * 2. Pick the mailer (SMTP or log-only) and the detector (HTTP or none)
 * 3. Build `AppState`
 * 4. Start the periodic reset-code cleanup task
 * 5. Create the router
 */

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use thiserror::Error;

use crate::backend::auth::verification::VerificationCodeStore;
use crate::backend::detection::{Detector, HttpDetector};
use crate::backend::mail::{LogMailer, MailError, Mailer, SmtpMailer};
use crate::backend::reports::blob::FsBlobStore;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::{AppState, Stores};

/// How often expired reset codes are purged
const CODE_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Startup failure
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("mailer error: {0}")]
    Mailer(#[from] MailError),
}

/// Create and configure the Axum application
///
/// # Errors
///
/// A configured database that cannot be reached or migrated, or an SMTP
/// configuration that cannot be turned into a transport, stops startup.
pub async fn create_app(config: &ServerConfig) -> Result<Router, StartupError> {
    tracing::info!("Initializing LesionScan backend server");

    let stores = match load_database(config.database_url.as_deref()).await? {
        Some(pool) => Stores::postgres(pool, Arc::new(FsBlobStore::new(&config.blob_dir))),
        None => Stores::in_memory(),
    };

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            tracing::info!("Sending email through {}:{}", smtp.host, smtp.port);
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set. Password reset emails will only be logged.");
            Arc::new(LogMailer)
        }
    };

    let detector: Option<Arc<dyn Detector>> = match &config.detector_url {
        Some(url) => {
            tracing::info!("Detection requests go to {}", url);
            Some(Arc::new(HttpDetector::new(url.clone())))
        }
        None => {
            tracing::warn!("DETECTOR_URL not set. POST /detect will answer 503.");
            None
        }
    };

    let state = AppState::new(stores, config.auth.clone(), mailer, detector);

    spawn_code_cleanup(state.resets.codes().clone(), config.auth.reset_code_ttl);

    let app = create_router(state, &config.static_dir);
    tracing::info!("Router configured with periodic cleanup task");

    Ok(app)
}

/// Periodically delete reset codes older than the reset window
///
/// Expired codes are already rejected by `consume`; this only keeps the
/// table small.
fn spawn_code_cleanup(codes: Arc<dyn VerificationCodeStore>, ttl: chrono::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(CODE_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match codes.delete_expired(Utc::now() - ttl).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!("Removed {} expired reset codes", removed),
                Err(e) => tracing::warn!("Failed to purge expired reset codes: {}", e),
            }
        }
    });
}

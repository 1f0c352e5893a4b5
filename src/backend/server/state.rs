/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `Stores` bundles the persistence trait objects; `AppState` holds the
 * services built on top of them:
 * - `SessionManager` - accounts and dual-token sessions
 * - `PasswordResetFlow` - reset codes and the mailer
 * - `ReportService` - report metadata and blobs
 * - `Option<Arc<dyn Detector>>` - `None` when no detector is configured
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract only the service they
 * use, e.g. `State(sessions): State<SessionManager>`.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::auth::reset::PasswordResetFlow;
use crate::backend::auth::service::SessionManager;
use crate::backend::auth::tokens::{MemoryTokenStore, PgTokenStore, TokenStore};
use crate::backend::auth::users::{MemoryUserStore, PgUserStore, UserStore};
use crate::backend::auth::verification::{
    MemoryVerificationCodeStore, PgVerificationCodeStore, VerificationCodeStore,
};
use crate::backend::detection::Detector;
use crate::backend::mail::Mailer;
use crate::backend::reports::blob::{BlobStore, MemoryBlobStore};
use crate::backend::reports::db::{MemoryReportStore, PgReportStore, ReportStore};
use crate::backend::reports::service::ReportService;
use crate::backend::server::config::AuthConfig;

/// Persistence backends shared by the services
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub codes: Arc<dyn VerificationCodeStore>,
    pub reports: Arc<dyn ReportStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Stores {
    /// PostgreSQL stores with the given blob store
    pub fn postgres(pool: PgPool, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            tokens: Arc::new(PgTokenStore::new(pool.clone())),
            codes: Arc::new(PgVerificationCodeStore::new(pool.clone())),
            reports: Arc::new(PgReportStore::new(pool)),
            blobs,
        }
    }

    /// Fully in-memory stores (development and tests)
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            tokens: Arc::new(MemoryTokenStore::new()),
            codes: Arc::new(MemoryVerificationCodeStore::new()),
            reports: Arc::new(MemoryReportStore::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
        }
    }
}

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub resets: PasswordResetFlow,
    pub reports: ReportService,
    pub detector: Option<Arc<dyn Detector>>,
}

impl AppState {
    /// Wire the services over a set of stores
    pub fn new(
        stores: Stores,
        auth: AuthConfig,
        mailer: Arc<dyn Mailer>,
        detector: Option<Arc<dyn Detector>>,
    ) -> Self {
        let auth = Arc::new(auth);
        Self {
            sessions: SessionManager::new(stores.users.clone(), stores.tokens.clone(), auth.clone()),
            resets: PasswordResetFlow::new(stores.users, stores.codes, mailer, auth),
            reports: ReportService::new(stores.reports, stores.blobs),
            detector,
        }
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for PasswordResetFlow {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.resets.clone()
    }
}

impl FromRef<AppState> for ReportService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.reports.clone()
    }
}

impl FromRef<AppState> for Option<Arc<dyn Detector>> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.detector.clone()
    }
}

/**
 * Report Service
 *
 * Stores uploaded reports and serves them back to their owner only. A
 * report owned by someone else is indistinguishable from a missing one.
 */

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::sessions::Principal;
use crate::backend::error::StoreError;
use crate::backend::reports::blob::{BlobError, BlobStore};
use crate::backend::reports::db::{Report, ReportStore, ReportSummary};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report not found")]
    NotFound,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ReportError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<BlobError> for ReportError {
    fn from(err: BlobError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A report as submitted by the client
#[derive(Debug, Clone, Default)]
pub struct NewReport {
    pub image: Bytes,
    pub pdf: Bytes,
    pub label: String,
    pub confidence: f64,
    pub risk_level: String,
    pub advice: String,
}

impl NewReport {
    fn validate(&self) -> Result<(), ReportError> {
        if self.image.is_empty() {
            return Err(ReportError::InvalidUpload("image must not be empty".to_string()));
        }
        if self.pdf.is_empty() {
            return Err(ReportError::InvalidUpload("pdf must not be empty".to_string()));
        }
        if self.label.trim().is_empty() {
            return Err(ReportError::InvalidUpload("label must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ReportError::InvalidUpload(
                "confidence must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { reports, blobs }
    }

    /// Store both files and the report metadata
    ///
    /// # Returns
    /// The new report id
    pub async fn upload(&self, owner: &Principal, new: NewReport) -> Result<Uuid, ReportError> {
        new.validate()?;

        let image_blob_id = self.blobs.put(new.image).await?;
        let pdf_blob_id = self.blobs.put(new.pdf).await?;

        let report = Report {
            id: Uuid::new_v4(),
            user_id: owner.user_id,
            image_blob_id,
            pdf_blob_id,
            label: new.label,
            confidence: new.confidence,
            risk_level: new.risk_level,
            advice: new.advice,
            created_at: Utc::now(),
        };
        self.reports.insert(&report).await?;

        tracing::info!("Report {} stored for user {}", report.id, owner.user_id);
        Ok(report.id)
    }

    /// The caller's reports, newest first
    pub async fn list_mine(&self, owner: &Principal) -> Result<Vec<ReportSummary>, ReportError> {
        let reports = self.reports.list_for_user(owner.user_id).await?;
        Ok(reports.into_iter().map(ReportSummary::from).collect())
    }

    pub async fn pdf(&self, owner: &Principal, report_id: Uuid) -> Result<Bytes, ReportError> {
        let report = self.owned(owner, report_id).await?;
        self.read_blob(&report.pdf_blob_id).await
    }

    pub async fn image(&self, owner: &Principal, report_id: Uuid) -> Result<Bytes, ReportError> {
        let report = self.owned(owner, report_id).await?;
        self.read_blob(&report.image_blob_id).await
    }

    async fn owned(&self, owner: &Principal, report_id: Uuid) -> Result<Report, ReportError> {
        match self.reports.find(report_id).await? {
            Some(report) if report.user_id == owner.user_id => Ok(report),
            Some(_) => {
                tracing::warn!("User {} requested report {} they do not own", owner.user_id, report_id);
                Err(ReportError::NotFound)
            }
            None => Err(ReportError::NotFound),
        }
    }

    async fn read_blob(&self, id: &str) -> Result<Bytes, ReportError> {
        match self.blobs.get(id).await {
            Ok(bytes) => Ok(bytes),
            Err(BlobError::NotFound(_)) => {
                tracing::error!("Report references missing blob {}", id);
                Err(ReportError::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }
}

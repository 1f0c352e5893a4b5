/**
 * Report Persistence
 *
 * Report metadata lives in the `reports` table; the image and PDF bytes
 * live in the blob store and are referenced by content id.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::error::StoreError;

/// A stored screening report
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_blob_id: String,
    pub pdf_blob_id: String,
    pub label: String,
    pub confidence: f64,
    pub risk_level: String,
    pub advice: String,
    pub created_at: DateTime<Utc>,
}

/// Report metadata returned by the listing endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportSummary {
    pub id: String,
    pub label: String,
    pub confidence: f64,
    pub risk_level: String,
    pub advice: String,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportSummary {
    fn from(report: Report) -> Self {
        Self {
            id: report.id.to_string(),
            label: report.label,
            confidence: report.confidence,
            risk_level: report.risk_level,
            advice: report.advice,
            created_at: report.created_at,
        }
    }
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: &Report) -> Result<(), StoreError>;

    /// Reports owned by `user_id`, newest first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Report>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Report>, StoreError>;
}

const REPORT_COLUMNS: &str =
    "id, user_id, image_blob_id, pdf_blob_id, label, confidence, risk_level, advice, created_at";

#[derive(Debug, Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: &Report) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO reports ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            REPORT_COLUMNS
        ))
        .bind(report.id)
        .bind(report.user_id)
        .bind(&report.image_blob_id)
        .bind(&report.pdf_blob_id)
        .bind(&report.label)
        .bind(report.confidence)
        .bind(&report.risk_level)
        .bind(&report.advice)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Report>, StoreError> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE user_id = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }
}

#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: RwLock<Vec<Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: &Report) -> Result<(), StoreError> {
        self.reports.write().await.push(report.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Report>, StoreError> {
        let mut reports: Vec<Report> = self
            .reports
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        Ok(self.reports.read().await.iter().find(|r| r.id == id).cloned())
    }
}

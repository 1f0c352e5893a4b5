/**
 * Report Handlers
 *
 * HTTP handlers for `/api/reports`. All of them require a bearer token.
 *
 * # Endpoints
 *
 * - `POST /upload` - multipart: `image`, `pdf` (files), `label`,
 *   `confidence`, `risk_level`, `advice` (text)
 * - `GET /me` - the caller's reports, newest first
 * - `GET /pdf/{report_id}` - the report PDF (`application/pdf`)
 * - `GET /image/{report_id}` - the report image (`image/jpeg`)
 */

use axum::{
    extract::{Multipart, Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::reports::db::ReportSummary;
use crate::backend::reports::service::{NewReport, ReportError, ReportService};
use crate::backend::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub report_id: String,
}

/// Read the upload form into a `NewReport`
///
/// Missing parts are reported together as a 422 request-shape error.
async fn read_upload(mut multipart: Multipart) -> Result<NewReport, BackendError> {
    let mut image: Option<Bytes> = None;
    let mut pdf: Option<Bytes> = None;
    let mut label = None;
    let mut confidence = None;
    let mut risk_level = None;
    let mut advice = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => image = Some(field.bytes().await?),
            "pdf" => pdf = Some(field.bytes().await?),
            "label" => label = Some(field.text().await?),
            "confidence" => confidence = Some(field.text().await?),
            "risk_level" => risk_level = Some(field.text().await?),
            "advice" => advice = Some(field.text().await?),
            other => tracing::debug!("Ignoring unexpected multipart field '{}'", other),
        }
    }

    let mut missing = Vec::new();
    for (field, present) in [
        ("image", image.is_some()),
        ("pdf", pdf.is_some()),
        ("label", label.is_some()),
        ("confidence", confidence.is_some()),
        ("risk_level", risk_level.is_some()),
        ("advice", advice.is_some()),
    ] {
        if !present {
            missing.push(serde_json::json!({
                "loc": ["body", field],
                "msg": "Field required",
                "type": "missing",
            }));
        }
    }
    if !missing.is_empty() {
        return Err(BackendError::RequestShape { details: missing });
    }

    let confidence_text = confidence.unwrap_or_default();
    let confidence = confidence_text.trim().parse::<f64>().map_err(|_| {
        BackendError::request_shape("confidence", "Input should be a valid number", "float_parsing")
    })?;

    Ok(NewReport {
        image: image.unwrap_or_default(),
        pdf: pdf.unwrap_or_default(),
        label: label.unwrap_or_default(),
        confidence,
        risk_level: risk_level.unwrap_or_default(),
        advice: advice.unwrap_or_default(),
    })
}

/// Report ids that are not UUIDs cannot exist
fn parse_report_id(raw: &str) -> Result<Uuid, ReportError> {
    Uuid::parse_str(raw).map_err(|_| ReportError::NotFound)
}

/// POST /api/reports/upload
pub async fn upload_report(
    State(reports): State<ReportService>,
    AuthUser(principal): AuthUser,
    multipart: Multipart,
) -> Result<ApiResponse<UploadResponse>, BackendError> {
    let new = read_upload(multipart).await?;
    let id = reports.upload(&principal, new).await?;
    Ok(ApiResponse::data(UploadResponse {
        report_id: id.to_string(),
    }))
}

/// GET /api/reports/me
pub async fn my_reports(
    State(reports): State<ReportService>,
    AuthUser(principal): AuthUser,
) -> Result<ApiResponse<Vec<ReportSummary>>, BackendError> {
    Ok(ApiResponse::data(reports.list_mine(&principal).await?))
}

/// GET /api/reports/pdf/{report_id}
pub async fn download_pdf(
    State(reports): State<ReportService>,
    AuthUser(principal): AuthUser,
    Path(report_id): Path<String>,
) -> Result<Response, BackendError> {
    let bytes = reports.pdf(&principal, parse_report_id(&report_id)?).await?;
    Ok(([(CONTENT_TYPE, "application/pdf")], bytes).into_response())
}

/// GET /api/reports/image/{report_id}
pub async fn get_image(
    State(reports): State<ReportService>,
    AuthUser(principal): AuthUser,
    Path(report_id): Path<String>,
) -> Result<Response, BackendError> {
    let bytes = reports.image(&principal, parse_report_id(&report_id)?).await?;
    Ok(([(CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

/**
 * Detection Handler
 *
 * `POST /detect` takes a multipart image in field `file` and returns the
 * enriched predictions. The response is a bare `{"predictions": [...]}`
 * object, not the success envelope.
 */

use std::sync::Arc;

use axum::{extract::{Multipart, State}, Json};
use serde::Serialize;

use crate::backend::detection::{DetectionError, Detector, Prediction};
use crate::backend::error::BackendError;

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub predictions: Vec<Prediction>,
}

pub async fn detect_lesion(
    State(detector): State<Option<Arc<dyn Detector>>>,
    mut multipart: Multipart,
) -> Result<Json<DetectResponse>, BackendError> {
    let detector = detector.ok_or(DetectionError::Unavailable)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.jpg").to_string();
            upload = Some((filename, field.bytes().await?));
        }
    }

    let (filename, image) = upload.ok_or_else(|| BackendError::request_shape("file", "Field required", "missing"))?;
    if image.is_empty() {
        return Err(DetectionError::EmptyImage.into());
    }

    let detections = detector.detect(image, &filename).await?;
    let predictions = detections.into_iter().map(Prediction::from).collect();

    Ok(Json(DetectResponse { predictions }))
}

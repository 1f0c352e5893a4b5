//! Detection Module
//!
//! Forwards uploaded images to an object-detection service and enriches
//! each detection with the lesion catalogue.
//!
//! # Module Structure
//!
//! ```text
//! detection/
//! ├── mod.rs       - Detector trait, HTTP client, errors
//! ├── catalogue.rs - Lesion classes and prediction enrichment
//! └── handlers.rs  - POST /detect
//! ```
//!
//! # Detector Protocol
//!
//! The HTTP detector receives the image as multipart field `file` and
//! answers with
//!
//! ```json
//! {"detections": [{"label": "MEL", "confidence": 0.91, "box": [x1, y1, x2, y2]}]}
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

pub mod catalogue;
pub mod handlers;

pub use catalogue::{lookup, LesionClass, Prediction, LESION_CLASSES};

#[derive(Debug, Error)]
pub enum DetectionError {
    /// No detector is configured
    #[error("Detection service unavailable")]
    Unavailable,

    #[error("Uploaded image is empty")]
    EmptyImage,

    /// The detector call failed or returned something unusable
    #[error("Detection service failed: {0}")]
    Upstream(String),
}

/// A raw detection from the model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    /// Bounding box `[x1, y1, x2, y2]` in pixels
    #[serde(rename = "box", default)]
    pub bbox: [f64; 4],
}

#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, image: Bytes, filename: &str) -> Result<Vec<Detection>, DetectionError>;
}

#[derive(Debug, Deserialize)]
struct DetectorResponse {
    detections: Vec<Detection>,
}

/// Detector reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpDetector {
    client: reqwest::Client,
    url: String,
}

impl HttpDetector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(&self, image: Bytes, filename: &str) -> Result<Vec<Detection>, DetectionError> {
        let part = multipart::Part::bytes(image.to_vec())
            .file_name(filename.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| DetectionError::Upstream(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DetectionError::Upstream(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DetectionError::Upstream(format!("status {}: {}", status, text)));
        }

        let body: DetectorResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::Upstream(format!("invalid response: {}", e)))?;

        tracing::debug!("Detector returned {} detections", body.detections.len());
        Ok(body.detections)
    }
}

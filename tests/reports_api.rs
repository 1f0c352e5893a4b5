//! Report and detection API integration tests

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{get_request, multipart_request, Part, TestApp};
use lesionscan::backend::detection::{Detection, DetectionError, Detector};

const PASSWORD: &str = "Str0ng!Pass";
const JPEG: &[u8] = b"\xff\xd8\xff\xe0 fake jpeg";
const PDF: &[u8] = b"%PDF-1.4 fake report";

fn upload_parts<'a>(label: &'a str, confidence: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::File("image", "lesion.jpg", "image/jpeg", JPEG),
        Part::File("pdf", "report.pdf", "application/pdf", PDF),
        Part::Text("label", label),
        Part::Text("confidence", confidence),
        Part::Text("risk_level", "High"),
        Part::Text("advice", "Consult a dermatologist."),
    ]
}

struct StubDetector {
    result: Result<Vec<Detection>, String>,
}

#[async_trait]
impl Detector for StubDetector {
    async fn detect(&self, image: Bytes, _filename: &str) -> Result<Vec<Detection>, DetectionError> {
        assert_eq!(&image[..], JPEG);
        self.result.clone().map_err(DetectionError::Upstream)
    }
}

#[tokio::test]
async fn test_upload_list_and_download() {
    let app = TestApp::new();
    let session = app.session("ana@x.com", PASSWORD).await;
    let token = Some(session.access_token.as_str());

    let (status, body) = app
        .send_json(multipart_request("/api/reports/upload", token, &upload_parts("MEL", "0.87")))
        .await;
    let data = assert_success!(status, body);
    let report_id = data["report_id"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/reports/me", token).await;
    let data = assert_success!(status, body);
    let reports = data.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["id"], json!(report_id));
    assert_eq!(reports[0]["label"], json!("MEL"));
    assert_eq!(reports[0]["confidence"], json!(0.87));
    assert_eq!(reports[0]["risk_level"], json!("High"));

    let (status, headers, bytes) = app
        .send(get_request(&format!("/api/reports/pdf/{}", report_id), token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/pdf");
    assert_eq!(&bytes[..], PDF);

    let (status, headers, bytes) = app
        .send(get_request(&format!("/api/reports/image/{}", report_id), token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/jpeg");
    assert_eq!(&bytes[..], JPEG);
}

#[tokio::test]
async fn test_reports_are_private() {
    let app = TestApp::new();
    let ana = app.session("ana@x.com", PASSWORD).await;
    let bob = app.session("bob@x.com", PASSWORD).await;

    let (status, body) = app
        .send_json(multipart_request(
            "/api/reports/upload",
            Some(&ana.access_token),
            &upload_parts("NV", "0.5"),
        ))
        .await;
    let data = assert_success!(status, body);
    let report_id = data["report_id"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/reports/me", Some(&bob.access_token)).await;
    let data = assert_success!(status, body);
    assert_eq!(data, json!([]));

    let (status, body) = app
        .get(&format!("/api/reports/pdf/{}", report_id), Some(&bob.access_token))
        .await;
    assert_error!(status, body, StatusCode::NOT_FOUND, "REPORT_NOT_FOUND");

    let (status, body) = app.get("/api/reports/image/not-a-uuid", Some(&ana.access_token)).await;
    assert_error!(status, body, StatusCode::NOT_FOUND, "REPORT_NOT_FOUND");
}

#[tokio::test]
async fn test_upload_validation() {
    let app = TestApp::new();
    let session = app.session("ana@x.com", PASSWORD).await;
    let token = Some(session.access_token.as_str());

    let (status, body) = app
        .send_json(multipart_request("/api/reports/upload", token, &upload_parts("MEL", "1.5")))
        .await;
    assert_error!(status, body, StatusCode::BAD_REQUEST, "INVALID_UPLOAD");

    let (status, body) = app
        .send_json(multipart_request("/api/reports/upload", token, &upload_parts("MEL", "high")))
        .await;
    assert_error!(status, body, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");

    let (status, body) = app
        .send_json(multipart_request(
            "/api/reports/upload",
            token,
            &[Part::Text("label", "MEL")],
        ))
        .await;
    assert_error!(status, body, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_reports_require_bearer_token() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/reports/me", None).await;
    assert_error!(status, body, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");

    let (status, body) = app
        .send_json(multipart_request("/api/reports/upload", None, &upload_parts("MEL", "0.9")))
        .await;
    assert_error!(status, body, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_detect_without_detector_is_503() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(multipart_request(
            "/detect",
            None,
            &[Part::File("file", "lesion.jpg", "image/jpeg", JPEG)],
        ))
        .await;
    assert_error!(status, body, StatusCode::SERVICE_UNAVAILABLE, "DETECTOR_UNAVAILABLE");
}

#[tokio::test]
async fn test_detect_enriches_predictions() {
    let detector = StubDetector {
        result: Ok(vec![
            Detection {
                label: "MEL".to_string(),
                confidence: 0.91234,
                bbox: [1.0, 2.0, 30.0, 40.0],
            },
            Detection {
                label: "XYZ".to_string(),
                confidence: 0.4,
                bbox: [0.0; 4],
            },
        ]),
    };
    let app = TestApp::with_detector(Some(Arc::new(detector)));

    let (status, body) = app
        .send_json(multipart_request(
            "/detect",
            None,
            &[Part::File("file", "lesion.jpg", "image/jpeg", JPEG)],
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0]["class"], json!("MEL"));
    assert_eq!(predictions[0]["confidence"], json!(0.91));
    assert_eq!(predictions[0]["full_label"], json!("Melanoma"));
    assert_eq!(predictions[0]["risk_level"], json!("High risk"));

    assert_eq!(predictions[1]["class"], json!("XYZ"));
    assert_eq!(predictions[1]["full_label"], json!("XYZ"));
    assert_eq!(predictions[1]["risk_level"], json!("Unknown"));
    assert_eq!(predictions[1]["advice"], json!("No advice available."));
}

#[tokio::test]
async fn test_detect_upstream_failure_is_502() {
    let detector = StubDetector {
        result: Err("model crashed".to_string()),
    };
    let app = TestApp::with_detector(Some(Arc::new(detector)));

    let (status, body) = app
        .send_json(multipart_request(
            "/detect",
            None,
            &[Part::File("file", "lesion.jpg", "image/jpeg", JPEG)],
        ))
        .await;
    assert_error!(status, body, StatusCode::BAD_GATEWAY, "DETECTOR_FAILED");
}

#[tokio::test]
async fn test_detect_missing_file_is_422() {
    let detector = StubDetector { result: Ok(Vec::new()) };
    let app = TestApp::with_detector(Some(Arc::new(detector)));

    let (status, body) = app
        .send_json(multipart_request("/detect", None, &[Part::Text("other", "x")]))
        .await;
    assert_error!(status, body, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
}

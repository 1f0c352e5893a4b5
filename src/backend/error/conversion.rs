/**
 * Error Conversion
 *
 * This module renders `BackendError` as an HTTP response and converts Axum
 * extractor rejections into `BackendError`.
 *
 * `IntoResponse` cannot see the request, so it renders the envelope with an
 * unknown path/hostname and attaches an `ErrorPayload` extension. The
 * `error_envelope` middleware, installed on the whole router, re-renders the
 * body with the request path and client address.
 */

use std::net::SocketAddr;

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::JsonRejection,
        ConnectInfo, Request,
    },
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::backend::error::types::BackendError;

/// Error details carried on a response until the envelope middleware renders them
#[derive(Debug, Clone)]
pub struct ErrorPayload {
    pub message: String,
    pub error_code: &'static str,
    pub details: Option<serde_json::Value>,
}

impl ErrorPayload {
    fn render(&self, status: StatusCode, path: &str, hostname: &str) -> Response {
        let mut error = json!({
            "path": path,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "hostname": hostname,
            "message": self.message,
            "error_code": self.error_code,
        });
        if let Some(details) = &self.details {
            error["details"] = details.clone();
        }

        let mut response = (status, Json(json!({ "success": false, "error": error }))).into_response();
        response.extensions_mut().insert(self.clone());
        response
    }
}

impl IntoResponse for BackendError {
    /// Convert a backend error into an HTTP response
    ///
    /// Server-side faults are logged here, once, with their full description.
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let payload = ErrorPayload {
            message: self.message(),
            error_code: self.error_code(),
            details: self.details(),
        };
        payload.render(status, "unknown", "unknown")
    }
}

/// Re-render error responses with the request path and client address
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let hostname = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;
    match response.extensions().get::<ErrorPayload>().cloned() {
        Some(payload) => {
            let status = response.status();
            let mut rendered = payload.render(status, &path, &hostname);
            // Keep headers such as WWW-Authenticate set by the original response
            for (name, value) in response.headers() {
                if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
                    rendered.headers_mut().append(name.clone(), value.clone());
                }
            }
            rendered
        }
        None => response,
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "value_error",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body",
        };
        tracing::debug!("Rejected JSON body: {}", rejection.body_text());
        Self::RequestShape {
            details: vec![json!({
                "loc": ["body"],
                "msg": rejection.body_text(),
                "type": kind,
            })],
        }
    }
}

impl From<MultipartError> for BackendError {
    fn from(err: MultipartError) -> Self {
        Self::request_shape("multipart", err.body_text(), "multipart")
    }
}

/// Header advertising the bearer scheme on 401 responses
pub(crate) fn bearer_challenge() -> (header::HeaderName, HeaderValue) {
    (header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))
}

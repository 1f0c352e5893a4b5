//! Common test utilities and helpers
//!
//! This module provides shared utilities for the HTTP suites:
//! - `TestApp`, the real router over in-memory stores
//! - `RecordingMailer`, which keeps every sent email
//! - Request helpers and a small multipart encoder
//! - Custom assertion macros

#![allow(dead_code)]

pub mod assertions;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use lesionscan::backend::detection::Detector;
use lesionscan::backend::mail::{MailError, Mailer};
use lesionscan::backend::routes::create_router;
use lesionscan::backend::server::{AppState, AuthConfig, Stores};

pub const BOUNDARY: &str = "lesionscan-test-boundary";

/// A sent email
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that records instead of sending
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail_with: Option<String>,
}

impl RecordingMailer {
    /// A mailer whose every send fails with a transport error
    pub fn failing(reason: &str) -> Self {
        Self {
            sent: Mutex::default(),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Reset code from the most recent email to `to`
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        let mail = self.sent().into_iter().rev().find(|mail| mail.to == to)?;
        let start = mail.body.find("token=")? + "token=".len();
        let rest = &mail.body[start..];
        let end = rest.find('&').unwrap_or(rest.len());
        Some(urlencoding::decode(&rest[..end]).ok()?.into_owned())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if let Some(reason) = &self.fail_with {
            return Err(MailError::Transport(reason.clone()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Fast auth settings for tests
pub fn test_auth_config() -> AuthConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", "integration-test-secret"),
        ("BCRYPT_COST", "4"),
        ("RESET_LINK_BASE", "http://localhost:8000/reset-password.html"),
    ]);
    AuthConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
        .expect("test auth config")
}

/// The application router over in-memory stores
pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    pub mailer: Arc<RecordingMailer>,
}

/// Tokens returned by login
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_detector(None)
    }

    pub fn with_detector(detector: Option<Arc<dyn Detector>>) -> Self {
        Self::build(detector, RecordingMailer::default())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        Self::build(None, mailer)
    }

    fn build(detector: Option<Arc<dyn Detector>>, mailer: RecordingMailer) -> Self {
        let stores = Stores::in_memory();
        let mailer = Arc::new(mailer);
        let state = AppState::new(stores.clone(), test_auth_config(), mailer.clone(), detector);
        let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static");
        Self {
            router: create_router(state, static_dir),
            stores,
            mailer,
        }
    }

    /// Send a request and return status, headers and raw body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    /// Send a request and parse the body as JSON (`Null` if it is not)
    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::post(path).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send_json(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send_json(get_request(path, token)).await
    }

    pub async fn signup(&self, name: &str, surname: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.post_json(
            "/api/auth/signup",
            serde_json::json!({
                "name": name,
                "surname": surname,
                "email": email,
                "password": password,
            }),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post_json(
            "/api/auth/login",
            serde_json::json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Sign up and log in, panicking on failure
    pub async fn session(&self, email: &str, password: &str) -> Session {
        let (status, body) = self.signup("Ana", "Smith", email, password).await;
        assert_eq!(status, StatusCode::OK, "signup failed: {}", body);
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        session_from(&body)
    }
}

pub fn session_from(body: &Value) -> Session {
    Session {
        access_token: body["data"]["access_token"].as_str().unwrap().to_string(),
        refresh_token: body["data"]["refresh_token"].as_str().unwrap().to_string(),
    }
}

pub fn get_request(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// One multipart form part
pub enum Part<'a> {
    Text(&'a str, &'a str),
    /// name, filename, content type, bytes
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

/// Encode a multipart/form-data body; returns the content type and body
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub fn multipart_request(path: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let (content_type, body) = multipart_body(parts);
    let mut builder = Request::post(path).header(header::CONTENT_TYPE, content_type);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

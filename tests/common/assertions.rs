//! Custom assertion macros and utilities
//!
//! Provides assertion macros for the HTTP test suites with descriptive
//! failure messages.

/// Assert a success envelope and return its `data` member
#[macro_export]
macro_rules! assert_success {
    ($status:expr, $body:expr) => {{
        assert_eq!(
            $status,
            axum::http::StatusCode::OK,
            "Expected 200, got {} with body {}",
            $status,
            $body
        );
        assert_eq!($body["success"], serde_json::json!(true), "Not a success envelope: {}", $body);
        $body["data"].clone()
    }};
}

/// Assert an error envelope with the given status and `error_code`
#[macro_export]
macro_rules! assert_error {
    ($status:expr, $body:expr, $expected_status:expr, $code:expr) => {{
        assert_eq!(
            $status, $expected_status,
            "Unexpected status; body was {}",
            $body
        );
        assert_eq!($body["success"], serde_json::json!(false), "Not an error envelope: {}", $body);
        assert_eq!(
            $body["error"]["error_code"],
            serde_json::json!($code),
            "Unexpected error code; body was {}",
            $body
        );
    }};
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

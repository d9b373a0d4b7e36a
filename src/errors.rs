// ABOUTME: Error taxonomy for the wger MCP server, aligned with HTTP status codes
// ABOUTME: Provides AppError/AppResult plus status classification and retry hints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # Error Handling
//!
//! All failures in this crate flow through [`AppError`], a flat taxonomy
//! aligned with the wger API's failure surface. Each [`ErrorCode`] maps to a
//! distinct user-visible message category so callers can decide whether to
//! retry, fix their credentials, or give up.

use serde_json::Value;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type AppResult<T> = Result<T, AppError>;

/// Classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing, invalid, or expired credentials (401).
    AuthenticationFailed,
    /// Malformed input, either rejected locally or by the API (400).
    InvalidInput,
    /// The requested resource does not exist (404).
    ResourceNotFound,
    /// The caller exceeded the API quota (429).
    RateLimitExceeded,
    /// Catch-all for API failures, carries the observed status code.
    ApiFailure,
    /// Startup configuration is invalid or incomplete.
    ConfigurationError,
}

/// Structured application error.
///
/// `Clone` is required because authentication failures are fanned out to
/// every waiter sharing one in-flight token acquisition.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    code: ErrorCode,
    message: String,
    status: Option<u16>,
    details: Option<Value>,
}

impl AppError {
    /// Create an error with an explicit code.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = match code {
            ErrorCode::AuthenticationFailed => Some(401),
            ErrorCode::ResourceNotFound => Some(404),
            ErrorCode::RateLimitExceeded => Some(429),
            _ => None,
        };
        Self {
            code,
            message: message.into(),
            status,
            details: None,
        }
    }

    /// Authentication failure (401).
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthenticationFailed, message)
    }

    /// Invalid input, rejected before or by the API.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found (404).
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, message)
    }

    /// Rate limit exceeded (429).
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimitExceeded, message)
    }

    /// Generic API failure with an optional status code.
    #[must_use]
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ApiFailure,
            message: message.into(),
            status,
            details: None,
        }
    }

    /// Invalid startup configuration.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message)
    }

    /// Attach an opaque details payload (typically the API response body).
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        if !details.is_null() {
            self.details = Some(details);
        }
        self
    }

    /// Classify an HTTP status code into the taxonomy.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>, details: Value) -> Self {
        let error = match status {
            401 => Self::auth(message),
            404 => Self::not_found(message),
            429 => Self::rate_limited(message),
            400 => Self::invalid_input(message),
            other => Self::api(Some(other), message),
        };
        error.with_details(details)
    }

    /// The error classification.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The HTTP status code observed, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The opaque details payload, if any.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Whether the failure is worth one backoff-and-retry attempt.
    ///
    /// Only 5xx server errors qualify here; recoverable transport errors are
    /// classified separately in [`crate::transport::TransportError`].
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::ApiFailure
            && self.status.is_some_and(|s| (500..600).contains(&s))
    }

    /// Human-readable message suitable for surfacing to an MCP client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.code {
            ErrorCode::AuthenticationFailed => {
                "Authentication failed. Please check your credentials in the environment variables."
                    .to_owned()
            }
            ErrorCode::RateLimitExceeded => {
                "Too many requests. Please wait a moment and try again.".to_owned()
            }
            ErrorCode::InvalidInput => format!("Invalid input: {}", self.message),
            ErrorCode::ApiFailure if self.status.is_some_and(|s| s >= 500) => {
                "The wger API is temporarily unavailable. Please try again later.".to_owned()
            }
            _ => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn status_classification_matches_taxonomy() {
        assert_eq!(
            AppError::from_status(401, "x", Value::Null).code(),
            ErrorCode::AuthenticationFailed
        );
        assert_eq!(
            AppError::from_status(404, "x", Value::Null).code(),
            ErrorCode::ResourceNotFound
        );
        assert_eq!(
            AppError::from_status(429, "x", Value::Null).code(),
            ErrorCode::RateLimitExceeded
        );
        assert_eq!(
            AppError::from_status(400, "x", Value::Null).code(),
            ErrorCode::InvalidInput
        );
        let e = AppError::from_status(503, "x", Value::Null);
        assert_eq!(e.code(), ErrorCode::ApiFailure);
        assert_eq!(e.status(), Some(503));
    }

    #[test]
    fn only_server_errors_are_retryable() {
        assert!(AppError::from_status(500, "x", Value::Null).is_retryable());
        assert!(AppError::from_status(599, "x", Value::Null).is_retryable());
        assert!(!AppError::from_status(404, "x", Value::Null).is_retryable());
        assert!(!AppError::from_status(401, "x", Value::Null).is_retryable());
        assert!(!AppError::api(None, "network down").is_retryable());
    }

    #[test]
    fn details_payload_is_preserved() {
        let e = AppError::from_status(400, "bad", json!({"field": "name"}));
        assert_eq!(e.details(), Some(&json!({"field": "name"})));
        // Null bodies are not stored as details.
        assert!(AppError::from_status(400, "bad", Value::Null).details().is_none());
    }

    #[test]
    fn user_messages_are_distinct_per_category() {
        let auth = AppError::auth("internal detail").user_message();
        assert!(auth.contains("credentials"));
        let rate = AppError::rate_limited("x").user_message();
        assert!(rate.contains("Too many requests"));
        let server = AppError::from_status(502, "gateway", Value::Null).user_message();
        assert!(server.contains("temporarily unavailable"));
        let missing = AppError::not_found("Exercise with ID 7 not found.").user_message();
        assert_eq!(missing, "Exercise with ID 7 not found.");
    }
}

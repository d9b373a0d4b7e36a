// ABOUTME: HTTP transport seam used by the auth manager and the wger client
// ABOUTME: Provides the Transport trait, a reqwest-backed impl, and error classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # Transport Layer
//!
//! Outbound HTTP is funneled through the [`Transport`] trait so that the
//! token manager and the resilient client can be exercised against scripted
//! fakes in tests. [`ReqwestTransport`] is the production implementation.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::errors::{AppError, AppResult};

/// Join a relative API path onto the base URL, preserving the base's own
/// path segments (a plain `Url::join` would discard `/api/v2`).
///
/// # Errors
/// Returns an invalid-input error when the combined URL fails to parse.
pub fn join_url(base: &Url, path: &str) -> AppResult<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|e| AppError::invalid_input(format!("invalid request path '{path}': {e}")))
}

/// A single outbound HTTP request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully resolved request URL.
    pub url: Url,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// JSON request body, if any.
    pub body: Option<Value>,
    /// Bearer credential, attached as `Authorization: Token <value>`.
    pub auth_token: Option<String>,
}

impl TransportRequest {
    /// Build a request with no query, body, or credential.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            body: None,
            auth_token: None,
        }
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a credential.
    #[must_use]
    pub fn with_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }
}

/// A decoded HTTP response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body; `Value::Null` for empty bodies, `Value::String`
    /// when the body is not valid JSON.
    pub body: Value,
}

impl TransportResponse {
    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failure, before any HTTP status was observed.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request exceeded the per-request timeout.
    #[error("request timed out")]
    Timeout,
    /// The peer reset the connection mid-request.
    #[error("connection reset by peer")]
    ConnectionReset,
    /// The connection was refused.
    #[error("connection refused")]
    ConnectionRefused,
    /// DNS resolution failed.
    #[error("host not found")]
    DnsNotFound,
    /// Any other transport failure.
    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether this failure belongs to the known recoverable set.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionReset | Self::ConnectionRefused | Self::DnsNotFound
        )
    }
}

/// Outbound HTTP transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch one request and decode the response body.
    ///
    /// # Errors
    /// Returns [`TransportError`] for network-level failures. Responses with
    /// non-2xx statuses are returned as `Ok`; classifying them is the
    /// caller's job.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given per-request timeout.
    ///
    /// # Errors
    /// Returns a configuration error if the underlying TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn classify(error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout;
        }
        if error.is_connect() {
            // reqwest folds refused connections and failed DNS lookups into
            // connect errors; the retry policy treats both the same way.
            let text = error.to_string();
            if text.contains("dns") {
                return TransportError::DnsNotFound;
            }
            return TransportError::ConnectionRefused;
        }
        let text = error.to_string();
        if text.contains("reset") {
            return TransportError::ConnectionReset;
        }
        TransportError::Other(text)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .header(reqwest::header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.auth_token {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Token {token}"));
        }

        let response = builder.send().await.map_err(|e| Self::classify(&e))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(TransportResponse { status, body })
    }
}

// ABOUTME: Resilient HTTP client for the wger API with auth injection and bounded retry
// ABOUTME: Classifies failures into the error taxonomy and self-heals from stale tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # wger API Client
//!
//! [`WgerClient`] wraps outbound calls with credential injection, uniform
//! error classification, and bounded retry, while staying agnostic of any
//! endpoint's semantics.
//!
//! Two recovery paths are kept separate: a transient server problem (5xx or
//! a recoverable network error) gets one backoff-and-retry attempt, while a
//! stale credential (401) gets one clear-token-and-reauthenticate attempt
//! with no delay. A second 401 always surfaces.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::constants::{
    BACKOFF_BASE_MS, BACKOFF_CAP_MS, DEFAULT_MAX_RETRIES, PUBLIC_RESOURCE_PATHS,
};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::transport::{join_url, Transport, TransportRequest};

/// Exponential backoff delay for a 0-based retry attempt, capped at 5s.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt);
    Duration::from_millis((BACKOFF_BASE_MS.saturating_mul(exp)).min(BACKOFF_CAP_MS))
}

/// Whether a request needs a credential attached.
///
/// Safe reads against the open reference-data endpoints are public; every
/// other method/path combination requires authentication. Token endpoints
/// are exempt entirely to avoid a circular dependency on the auth manager.
fn requires_auth(method: &Method, path: &str) -> bool {
    if path.contains("/token") {
        return false;
    }
    let public = PUBLIC_RESOURCE_PATHS
        .iter()
        .any(|prefix| path.starts_with(prefix));
    *method != Method::GET || !public
}

/// Extract a human-readable message from an API error body.
fn error_message(body: &Value) -> Option<String> {
    body.get("detail")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// HTTP client for the wger API.
pub struct WgerClient {
    transport: Arc<dyn Transport>,
    auth: Arc<AuthManager>,
    api_url: Url,
    max_retries: u32,
}

impl WgerClient {
    /// Create a client over the given transport and auth manager.
    #[must_use]
    pub fn new(config: &ServerConfig, transport: Arc<dyn Transport>, auth: Arc<AuthManager>) -> Self {
        Self {
            transport,
            auth,
            api_url: config.api_url.clone(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override the retry budget (used by tests).
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// GET a resource.
    ///
    /// # Errors
    /// Fails with any taxonomy error after retries are exhausted.
    pub async fn get(&self, path: &str, query: &[(String, String)]) -> AppResult<Value> {
        self.execute(Method::GET, path, query, None).await
    }

    /// POST a JSON body.
    ///
    /// # Errors
    /// Fails with any taxonomy error after retries are exhausted.
    pub async fn post(&self, path: &str, body: Option<&Value>) -> AppResult<Value> {
        self.execute(Method::POST, path, &[], body.cloned()).await
    }

    /// PUT a JSON body.
    ///
    /// # Errors
    /// Fails with any taxonomy error after retries are exhausted.
    pub async fn put(&self, path: &str, body: Option<&Value>) -> AppResult<Value> {
        self.execute(Method::PUT, path, &[], body.cloned()).await
    }

    /// PATCH a JSON body.
    ///
    /// # Errors
    /// Fails with any taxonomy error after retries are exhausted.
    pub async fn patch(&self, path: &str, body: Option<&Value>) -> AppResult<Value> {
        self.execute(Method::PATCH, path, &[], body.cloned()).await
    }

    /// DELETE a resource.
    ///
    /// # Errors
    /// Fails with any taxonomy error after retries are exhausted.
    pub async fn delete(&self, path: &str) -> AppResult<Value> {
        self.execute(Method::DELETE, path, &[], None).await
    }

    /// Execute one logical request through the retry pipeline.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> AppResult<Value> {
        let url = join_url(&self.api_url, path)?;
        let needs_auth = requires_auth(&method, path);
        let mut attempt: u32 = 0;

        loop {
            let mut request = TransportRequest::new(method.clone(), url.clone());
            if !query.is_empty() {
                request = request.with_query(query.to_vec());
            }
            if let Some(payload) = &body {
                request = request.with_body(payload.clone());
            }
            // Token injection runs per attempt so a cleared credential is
            // re-acquired before the retry. Auth manager failures propagate
            // without attempting the call.
            if needs_auth && self.auth.has_credentials() {
                let token = self.auth.get_token().await?;
                request = request.with_token(token);
            }

            debug!(%method, path, attempt, "dispatching request");

            let error = match self.transport.send(request).await {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, path, "request succeeded");
                    return Ok(response.body);
                }
                Ok(response) => {
                    warn!(status = response.status, path, "request failed");
                    let message = error_message(&response.body).unwrap_or_else(|| {
                        format!("Request failed with HTTP {}", response.status)
                    });
                    AppError::from_status(response.status, message, response.body)
                }
                Err(transport_error) => {
                    warn!(path, "transport error: {transport_error}");
                    if attempt < self.max_retries && transport_error.is_retryable() {
                        let delay = backoff_delay(attempt);
                        info!(
                            "retrying request after {}ms (attempt {}/{})",
                            delay.as_millis(),
                            attempt + 1,
                            self.max_retries
                        );
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    AppError::api(None, format!("Request failed: {transport_error}"))
                }
            };

            if attempt < self.max_retries && error.is_retryable() {
                let delay = backoff_delay(attempt);
                info!(
                    "retrying request after {}ms (attempt {}/{})",
                    delay.as_millis(),
                    attempt + 1,
                    self.max_retries
                );
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            // A stale credential earns exactly one immediate re-auth attempt.
            if error.code() == ErrorCode::AuthenticationFailed && attempt == 0 {
                info!("attempting to re-authenticate after 401 error");
                self.auth.clear_token().await;
                attempt += 1;
                continue;
            }

            return Err(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn safe_reads_on_open_paths_are_public() {
        assert!(!requires_auth(&Method::GET, "/exercise/"));
        assert!(!requires_auth(&Method::GET, "/exercisecategory/"));
        assert!(!requires_auth(&Method::GET, "/muscle/"));
        assert!(!requires_auth(&Method::GET, "/equipment/"));
    }

    #[test]
    fn writes_and_private_paths_require_auth() {
        assert!(requires_auth(&Method::POST, "/exercise/"));
        assert!(requires_auth(&Method::GET, "/routine/"));
        assert!(requires_auth(&Method::DELETE, "/set/12/"));
    }

    #[test]
    fn token_endpoints_are_exempt() {
        assert!(!requires_auth(&Method::POST, "/token/"));
        assert!(!requires_auth(&Method::POST, "/token/refresh/"));
    }

    #[test]
    fn backoff_is_exponential_and_capped() {
        assert_eq!(backoff_delay(0), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(1), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(2), Duration::from_millis(4_000));
        assert_eq!(backoff_delay(3), Duration::from_millis(5_000));
        assert_eq!(backoff_delay(10), Duration::from_millis(5_000));
    }

    #[test]
    fn error_messages_prefer_detail_over_message() {
        assert_eq!(
            error_message(&json!({"detail": "no such exercise"})).as_deref(),
            Some("no such exercise")
        );
        assert_eq!(
            error_message(&json!({"message": "bad request"})).as_deref(),
            Some("bad request")
        );
        assert_eq!(error_message(&json!({"other": 1})), None);
    }
}

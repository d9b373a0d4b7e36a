// ABOUTME: Shared test utilities: scripted fake transport and context builders
// ABOUTME: Lets auth, client, and tool tests run without a network or real clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code, missing_docs, clippy::must_use_candidate)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use wger_mcp_server::auth::AuthManager;
use wger_mcp_server::cache::TtlCache;
use wger_mcp_server::client::WgerClient;
use wger_mcp_server::config::ServerConfig;
use wger_mcp_server::tools::ToolExecutionContext;
use wger_mcp_server::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Scripted transport: responses are served in FIFO order and every request
/// is recorded for later assertions.
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Mutex<Vec<TransportRequest>>,
    delay: Duration,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Delay each send so concurrent callers overlap under paused time.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_response(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse { status, body }));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<TransportRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// URL paths of all recorded requests, in order.
    pub fn paths(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.url.path().to_owned())
            .collect()
    }
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response".to_owned())))
    }
}

fn base_config() -> ServerConfig {
    ServerConfig {
        api_key: None,
        username: None,
        password: None,
        api_url: Url::parse("https://wger.test/api/v2").unwrap(),
        http_timeout: Duration::from_millis(10_000),
        log_level: "info".to_owned(),
        cache_ttl_static_secs: 86_400,
        cache_ttl_exercise_secs: 3_600,
    }
}

/// Configuration with a static API key.
pub fn api_key_config() -> ServerConfig {
    ServerConfig {
        api_key: Some("key-123".to_owned()),
        ..base_config()
    }
}

/// Configuration with username/password credentials.
pub fn password_config() -> ServerConfig {
    ServerConfig {
        username: Some("athlete".to_owned()),
        password: Some("hunter2".to_owned()),
        ..base_config()
    }
}

/// Configuration with no credentials at all. `ServerConfig::from_env` would
/// reject this; building it directly exercises the anonymous code paths.
pub fn anonymous_config() -> ServerConfig {
    base_config()
}

/// Wire a full execution context around a fake transport.
pub fn context_with(config: ServerConfig, transport: Arc<FakeTransport>) -> ToolExecutionContext {
    let config = Arc::new(config);
    let auth = Arc::new(AuthManager::new(&config, transport.clone()));
    let client = Arc::new(WgerClient::new(&config, transport, auth.clone()));
    let cache = Arc::new(TtlCache::new());
    ToolExecutionContext {
        config,
        auth,
        client,
        cache,
    }
}

// ABOUTME: Resilient client tests: auth injection, retry policy, and error classification
// ABOUTME: Backoff delays run under paused Tokio time so retries are instantaneous
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

mod common;

use std::sync::Arc;

use serde_json::json;

use common::FakeTransport;
use wger_mcp_server::auth::AuthManager;
use wger_mcp_server::client::WgerClient;
use wger_mcp_server::config::ServerConfig;
use wger_mcp_server::errors::ErrorCode;
use wger_mcp_server::transport::TransportError;

fn client(config: ServerConfig, transport: &Arc<FakeTransport>) -> WgerClient {
    let auth = Arc::new(AuthManager::new(&config, transport.clone()));
    WgerClient::new(&config, transport.clone(), auth)
}

#[tokio::test]
async fn public_read_is_sent_without_credentials() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(200, json!({"count": 0, "next": null, "previous": null, "results": []}));
    let client = client(common::api_key_config(), &transport);

    client.get("/exercise/", &[]).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].auth_token.is_none());
    assert_eq!(calls[0].url.path(), "/api/v2/exercise/");
}

#[tokio::test]
async fn anonymous_public_read_never_touches_token_endpoints() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(200, json!({"results": []}));
    let client = client(common::anonymous_config(), &transport);

    client.get("/muscle/", &[]).await.unwrap();
    assert_eq!(transport.paths(), vec!["/api/v2/muscle/"]);
}

#[tokio::test]
async fn private_request_carries_the_api_key() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(201, json!({"id": 5, "name": "Push day"}));
    let client = client(common::api_key_config(), &transport);

    client.post("/routine/", Some(&json!({"name": "Push day"}))).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].auth_token.as_deref(), Some("key-123"));
}

#[tokio::test]
async fn query_parameters_are_forwarded() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(200, json!({"results": []}));
    let client = client(common::anonymous_config(), &transport);

    let query = vec![
        ("limit".to_owned(), "20".to_owned()),
        ("search".to_owned(), "bench".to_owned()),
    ];
    client.get("/exercise/", &query).await.unwrap();
    assert_eq!(transport.calls()[0].query, query);
}

#[tokio::test(start_paused = true)]
async fn server_error_is_retried_once_with_backoff() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(500, json!({"detail": "internal error"}));
    transport.push_response(200, json!({"id": 9}));
    let client = client(common::api_key_config(), &transport);

    let body = client.get("/routine/9/", &[]).await.unwrap();
    assert_eq!(body, json!({"id": 9}));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn retries_stop_once_the_budget_is_spent() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(500, json!({"detail": "still broken"}));
    transport.push_response(502, json!({}));
    let client = client(common::api_key_config(), &transport);

    let err = client.get("/routine/", &[]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ApiFailure);
    assert_eq!(err.status(), Some(502));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn recoverable_transport_errors_are_retried() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_error(TransportError::Timeout);
    transport.push_response(200, json!({"results": []}));
    let client = client(common::anonymous_config(), &transport);

    client.get("/equipment/", &[]).await.unwrap();
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn unrecoverable_transport_errors_fail_immediately() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_error(TransportError::Other("tls handshake failed".to_owned()));
    let client = client(common::anonymous_config(), &transport);

    let err = client.get("/equipment/", &[]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ApiFailure);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn stale_token_is_cleared_and_reacquired_once() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(200, json!({"access": "tok-1", "refresh": "ref-1"}));
    transport.push_response(401, json!({"detail": "Invalid token"}));
    transport.push_response(200, json!({"access": "tok-2", "refresh": "ref-2"}));
    transport.push_response(200, json!({"count": 0, "results": []}));
    let client = client(common::password_config(), &transport);

    client.get("/routine/", &[]).await.unwrap();

    let calls = transport.calls();
    assert_eq!(
        transport.paths(),
        vec![
            "/api/v2/token/",
            "/api/v2/routine/",
            "/api/v2/token/",
            "/api/v2/routine/",
        ]
    );
    assert_eq!(calls[1].auth_token.as_deref(), Some("tok-1"));
    assert_eq!(calls[3].auth_token.as_deref(), Some("tok-2"));
}

#[tokio::test]
async fn second_consecutive_401_surfaces_to_the_caller() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(200, json!({"access": "tok-1", "refresh": "ref-1"}));
    transport.push_response(401, json!({"detail": "Invalid token"}));
    transport.push_response(200, json!({"access": "tok-2", "refresh": "ref-2"}));
    transport.push_response(401, json!({"detail": "Invalid token"}));
    let client = client(common::password_config(), &transport);

    let err = client.get("/routine/", &[]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthenticationFailed);
    assert_eq!(transport.call_count(), 4);
}

#[tokio::test]
async fn missing_resources_are_not_retried() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(404, json!({"detail": "Not found."}));
    let client = client(common::anonymous_config(), &transport);

    let err = client.get("/exercise/999999/", &[]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);
    assert_eq!(err.to_string(), "Not found.");
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn client_errors_map_to_the_taxonomy() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(400, json!({"message": "name is required"}));
    let client = client(common::api_key_config(), &transport);
    let err = client.post("/routine/", Some(&json!({}))).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert_eq!(err.to_string(), "name is required");

    transport.push_response(429, json!({}));
    let err = client.get("/routine/", &[]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::RateLimitExceeded);
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn delete_accepts_an_empty_body() {
    let transport = Arc::new(FakeTransport::new());
    transport.push_response(204, serde_json::Value::Null);
    let client = client(common::api_key_config(), &transport);

    let body = client.delete("/set/12/").await.unwrap();
    assert!(body.is_null());
}

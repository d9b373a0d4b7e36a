// ABOUTME: Application-wide constants for auth lifetimes, retry policy, and caching
// ABOUTME: Centralizes the wger endpoint paths and cache key prefixes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! Application constants and configuration values.

use std::time::Duration;

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision implemented by this server.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during MCP initialization.
pub const SERVER_NAME: &str = "wger-mcp-server";

/// Default wger API base URL.
pub const DEFAULT_API_URL: &str = "https://wger.de/api/v2";

/// Default per-request HTTP timeout in milliseconds.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Default TTL for rarely-changing reference data (24 hours).
pub const DEFAULT_STATIC_CACHE_TTL_SECS: u64 = 86_400;

/// Default TTL for exercise detail lookups (1 hour).
pub const DEFAULT_EXERCISE_CACHE_TTL_SECS: u64 = 3_600;

/// Default TTL applied by the cache when none is given.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3_600);

/// How often the cache sweeps out expired entries.
pub const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// How long an issued access token is trusted. The wger API issues tokens
/// valid for roughly an hour; 55 minutes leaves a safety margin.
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(55 * 60);

/// A cached token within this margin of expiry is refreshed before use.
pub const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Maximum number of backoff retries for retryable failures.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Base delay for exponential retry backoff.
pub const BACKOFF_BASE_MS: u64 = 1_000;

/// Upper bound on the retry backoff delay.
pub const BACKOFF_CAP_MS: u64 = 5_000;

/// Token issuance endpoint, relative to the API base URL.
pub const TOKEN_ENDPOINT: &str = "/token/";

/// Token refresh endpoint, relative to the API base URL.
pub const TOKEN_REFRESH_ENDPOINT: &str = "/token/refresh/";

/// Resource path prefixes that are readable without credentials.
pub const PUBLIC_RESOURCE_PATHS: [&str; 4] =
    ["/exercise", "/muscle", "/equipment", "/exercisecategory"];

/// Cache keys for reference-data tools.
pub mod cache_keys {
    /// All exercise categories.
    pub const CATEGORIES: &str = "categories:all";
    /// All equipment entries.
    pub const EQUIPMENT: &str = "equipment:all";
    /// All muscle groups.
    pub const MUSCLES: &str = "muscles:all";

    /// Per-exercise detail key.
    #[must_use]
    pub fn exercise(id: u64) -> String {
        format!("exercise:{id}")
    }
}

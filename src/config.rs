// ABOUTME: Environment-based configuration for the wger MCP server
// ABOUTME: Validates credentials, API URL, timeouts, and cache TTLs at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # Configuration
//!
//! Configuration is environment-only, loaded once at startup by
//! [`ServerConfig::from_env`]. At least one authentication method (an API key
//! or a username/password pair) must be present or startup fails fast with a
//! configuration error.

use std::env;
use std::time::Duration;
use url::Url;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_EXERCISE_CACHE_TTL_SECS, DEFAULT_HTTP_TIMEOUT_MS,
    DEFAULT_STATIC_CACHE_TTL_SECS,
};
use crate::errors::{AppError, AppResult};

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Static wger API key (`WGER_API_KEY`).
    pub api_key: Option<String>,
    /// Username for token-based authentication (`WGER_USERNAME`).
    pub username: Option<String>,
    /// Password for token-based authentication (`WGER_PASSWORD`).
    pub password: Option<String>,
    /// Base URL of the wger API (`WGER_API_URL`).
    pub api_url: Url,
    /// Per-request HTTP timeout (`HTTP_TIMEOUT`, milliseconds).
    pub http_timeout: Duration,
    /// Log level filter (`LOG_LEVEL`).
    pub log_level: String,
    /// TTL in seconds for reference data caching (`CACHE_TTL_STATIC`).
    pub cache_ttl_static_secs: u64,
    /// TTL in seconds for exercise detail caching (`CACHE_TTL_EXERCISE`).
    pub cache_ttl_exercise_secs: u64,
}

impl ServerConfig {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    /// Returns a [`crate::errors::ErrorCode::ConfigurationError`] when no
    /// authentication method is configured or a value fails validation.
    pub fn from_env() -> AppResult<Self> {
        let api_key = env_opt("WGER_API_KEY");
        let username = env_opt("WGER_USERNAME");
        let password = env_opt("WGER_PASSWORD");

        if api_key.is_none() && (username.is_none() || password.is_none()) {
            return Err(AppError::config(
                "Authentication required: provide either WGER_API_KEY or both \
                 WGER_USERNAME and WGER_PASSWORD",
            ));
        }

        let api_url = env_opt("WGER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = Url::parse(&api_url)
            .map_err(|e| AppError::config(format!("WGER_API_URL is not a valid URL: {e}")))?;

        let timeout_ms = env_positive("HTTP_TIMEOUT", DEFAULT_HTTP_TIMEOUT_MS)?;
        let log_level = env_opt("LOG_LEVEL").unwrap_or_else(|| "info".to_owned());
        if !matches!(log_level.as_str(), "debug" | "info" | "warn" | "error") {
            return Err(AppError::config(format!(
                "LOG_LEVEL must be one of debug, info, warn, error (got '{log_level}')"
            )));
        }

        Ok(Self {
            api_key,
            username,
            password,
            api_url,
            http_timeout: Duration::from_millis(timeout_ms),
            log_level,
            cache_ttl_static_secs: env_positive("CACHE_TTL_STATIC", DEFAULT_STATIC_CACHE_TTL_SECS)?,
            cache_ttl_exercise_secs: env_positive(
                "CACHE_TTL_EXERCISE",
                DEFAULT_EXERCISE_CACHE_TTL_SECS,
            )?,
        })
    }

    /// Whether any authentication method is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() || (self.username.is_some() && self.password.is_some())
    }
}

/// Read an environment variable, treating empty values as absent.
fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read a positive integer environment variable with a default.
fn env_positive(name: &str, default: u64) -> AppResult<u64> {
    match env_opt(name) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(AppError::config(format!(
                "{name} must be a positive integer (got '{raw}')"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::errors::ErrorCode;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "WGER_API_KEY",
            "WGER_USERNAME",
            "WGER_PASSWORD",
            "WGER_API_URL",
            "HTTP_TIMEOUT",
            "LOG_LEVEL",
            "CACHE_TTL_STATIC",
            "CACHE_TTL_EXERCISE",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn fails_fast_without_credentials() {
        clear_env();
        let err = ServerConfig::from_env().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
    }

    #[test]
    #[serial]
    fn username_without_password_is_incomplete() {
        clear_env();
        env::set_var("WGER_USERNAME", "athlete");
        let err = ServerConfig::from_env().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
    }

    #[test]
    #[serial]
    fn api_key_alone_is_sufficient_and_defaults_apply() {
        clear_env();
        env::set_var("WGER_API_KEY", "abc123");
        let config = ServerConfig::from_env().unwrap();
        assert!(config.has_credentials());
        assert_eq!(config.api_url.as_str(), "https://wger.de/api/v2");
        assert_eq!(config.http_timeout, Duration::from_millis(10_000));
        assert_eq!(config.cache_ttl_static_secs, 86_400);
        assert_eq!(config.cache_ttl_exercise_secs, 3_600);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    #[serial]
    fn rejects_malformed_url_and_timeout() {
        clear_env();
        env::set_var("WGER_API_KEY", "abc123");
        env::set_var("WGER_API_URL", "not a url");
        assert!(ServerConfig::from_env().is_err());

        env::set_var("WGER_API_URL", "https://wger.example/api/v2");
        env::set_var("HTTP_TIMEOUT", "0");
        assert!(ServerConfig::from_env().is_err());

        env::set_var("HTTP_TIMEOUT", "2500");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_timeout, Duration::from_millis(2_500));
        clear_env();
    }
}

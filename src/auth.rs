// ABOUTME: Token manager for the wger API with caching, refresh, and single-flight acquisition
// ABOUTME: Concurrent callers share one in-flight acquisition and observe the same outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # Authentication
//!
//! [`AuthManager`] produces a currently-valid credential for outbound calls.
//! A static API key is returned directly with no network round trip. With
//! username/password credentials, issued tokens are cached for 55 minutes,
//! refreshed when within 5 minutes of expiry, and re-acquired from scratch
//! when refresh fails.
//!
//! At most one acquisition or refresh is in flight per manager: concurrent
//! `get_token` callers attach to a shared future instead of issuing
//! duplicate requests, and all of them observe the same value or error.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ServerConfig;
use crate::constants::{TOKEN_ENDPOINT, TOKEN_REFRESH_ENDPOINT, TOKEN_REFRESH_MARGIN, TOKEN_VALIDITY};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::transport::{join_url, Transport, TransportRequest};

const NO_CREDENTIALS_MESSAGE: &str =
    "No authentication credentials provided. Please set WGER_API_KEY or WGER_USERNAME \
     and WGER_PASSWORD environment variables.";

/// Token issuance response from `POST /token/`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access: String,
    refresh: String,
}

/// Token refresh response from `POST /token/refresh/`.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Debug, Clone)]
struct TokenCache {
    access_token: String,
    refresh_token: String,
    expires_at: Instant,
}

impl TokenCache {
    /// A token within the refresh margin of expiry is no longer trusted.
    fn is_valid(&self, now: Instant) -> bool {
        self.expires_at > now + TOKEN_REFRESH_MARGIN
    }
}

type TokenFuture = Shared<BoxFuture<'static, AppResult<String>>>;

#[derive(Default)]
struct AuthState {
    cache: Option<TokenCache>,
    in_flight: Option<TokenFuture>,
}

struct AuthInner {
    transport: Arc<dyn Transport>,
    api_url: Url,
    api_key: Option<String>,
    username: Option<String>,
    password: Option<String>,
    state: Mutex<AuthState>,
}

/// Authentication manager for the wger API.
pub struct AuthManager {
    inner: Arc<AuthInner>,
}

impl AuthManager {
    /// Create a manager from configuration and a transport for the token
    /// endpoints.
    #[must_use]
    pub fn new(config: &ServerConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                transport,
                api_url: config.api_url.clone(),
                api_key: config.api_key.clone(),
                username: config.username.clone(),
                password: config.password.clone(),
                state: Mutex::new(AuthState::default()),
            }),
        }
    }

    /// Get a valid credential for outbound calls.
    ///
    /// A configured API key is returned directly; otherwise the cached token
    /// is returned, refreshed, or re-acquired as needed.
    ///
    /// # Errors
    /// Fails with an authentication error when no credentials are configured
    /// or acquisition fails. No retrying happens here; that is the HTTP
    /// client's job.
    pub async fn get_token(&self) -> AppResult<String> {
        // The API key is the token; no exchange, caching, or expiry applies.
        if let Some(key) = &self.inner.api_key {
            debug!("using API key for authentication");
            return Ok(key.clone());
        }

        if self.inner.username.is_none() || self.inner.password.is_none() {
            return Err(AppError::auth(NO_CREDENTIALS_MESSAGE));
        }

        let acquisition = {
            let mut state = self.inner.state.lock().await;
            if let Some(pending) = &state.in_flight {
                debug!("joining in-flight token acquisition");
                pending.clone()
            } else {
                let now = Instant::now();
                if let Some(cache) = state.cache.as_ref().filter(|c| c.is_valid(now)) {
                    debug!("using cached authentication token");
                    return Ok(cache.access_token.clone());
                }
                let pending = Self::start_acquisition(Arc::clone(&self.inner));
                state.in_flight = Some(pending.clone());
                pending
            }
        };

        acquisition.await
    }

    /// Whether any authentication method is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.inner.api_key.is_some()
            || (self.inner.username.is_some() && self.inner.password.is_some())
    }

    /// Drop the cached token, forcing re-authentication on the next call.
    pub async fn clear_token(&self) {
        self.inner.state.lock().await.cache = None;
        debug!("cleared cached authentication token");
    }

    /// Recover from an observed authentication error: clear the cached
    /// token, force a fresh acquisition, then run `retry_fn` once.
    ///
    /// # Errors
    /// Authentication errors from acquisition or `retry_fn` pass through
    /// unchanged; any other `retry_fn` failure is wrapped as an
    /// authentication error.
    pub async fn handle_auth_error<T, F, Fut>(&self, retry_fn: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        info!("handling authentication error, attempting to re-authenticate");
        self.clear_token().await;
        self.get_token().await?;
        match retry_fn().await {
            Ok(value) => Ok(value),
            Err(e) if e.code() == ErrorCode::AuthenticationFailed => Err(e),
            Err(e) => Err(AppError::auth(format!("Re-authentication failed: {e}"))),
        }
    }

    /// Kick off one shared acquisition. The returned future updates the
    /// manager state on completion: the cache holds the new token on
    /// success and is cleared on failure, and the in-flight slot is freed
    /// either way.
    fn start_acquisition(inner: Arc<AuthInner>) -> TokenFuture {
        async move {
            let result = inner.acquire().await;
            let mut state = inner.state.lock().await;
            state.in_flight = None;
            match result {
                Ok(cache) => {
                    let access = cache.access_token.clone();
                    state.cache = Some(cache);
                    Ok(access)
                }
                Err(e) => {
                    state.cache = None;
                    Err(e)
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl AuthInner {
    /// One acquisition attempt: refresh when a refresh token exists, falling
    /// back to requesting a brand-new token when refresh fails.
    async fn acquire(&self) -> AppResult<TokenCache> {
        let cached = self.state.lock().await.cache.clone();

        if let Some(cache) = cached {
            debug!("attempting to refresh authentication token");
            match self.refresh_token(&cache.refresh_token).await {
                Ok(access) => {
                    info!("successfully refreshed authentication token");
                    return Ok(TokenCache {
                        access_token: access,
                        refresh_token: cache.refresh_token,
                        expires_at: Instant::now() + TOKEN_VALIDITY,
                    });
                }
                Err(e) => {
                    // Recoverable: fall through and authenticate from scratch.
                    warn!("token refresh failed, will request new token: {e}");
                }
            }
        }

        debug!("requesting new authentication token");
        self.request_token().await
    }

    async fn request_token(&self) -> AppResult<TokenCache> {
        let body = if let Some(key) = &self.api_key {
            debug!("authenticating with API key");
            json!({ "api_key": key })
        } else if let (Some(username), Some(password)) = (&self.username, &self.password) {
            debug!("authenticating with username/password");
            json!({ "username": username, "password": password })
        } else {
            return Err(AppError::auth(NO_CREDENTIALS_MESSAGE));
        };

        let url = join_url(&self.api_url, TOKEN_ENDPOINT)?;
        let response = self
            .transport
            .send(TransportRequest::new(Method::POST, url).with_body(body))
            .await
            .map_err(|e| AppError::auth(format!("Authentication request failed: {e}")))?;

        if response.status == 401 {
            return Err(
                AppError::auth("Authentication failed. Please verify your credentials.")
                    .with_details(response.body),
            );
        }
        if !response.is_success() {
            return Err(AppError::auth(format!(
                "Authentication request failed with HTTP {}",
                response.status
            ))
            .with_details(response.body));
        }

        let payload: TokenResponse = serde_json::from_value(response.body)
            .map_err(|e| AppError::auth(format!("Authentication response was malformed: {e}")))?;

        info!("successfully authenticated with wger API");
        Ok(TokenCache {
            access_token: payload.access,
            refresh_token: payload.refresh,
            expires_at: Instant::now() + TOKEN_VALIDITY,
        })
    }

    async fn refresh_token(&self, refresh: &str) -> AppResult<String> {
        let url = join_url(&self.api_url, TOKEN_REFRESH_ENDPOINT)?;
        let response = self
            .transport
            .send(TransportRequest::new(Method::POST, url).with_body(json!({ "refresh": refresh })))
            .await
            .map_err(|e| AppError::auth(format!("Token refresh request failed: {e}")))?;

        if response.status == 401 {
            return Err(AppError::auth(
                "Token refresh failed. Please re-authenticate.",
            ));
        }
        if !response.is_success() {
            return Err(AppError::auth(format!(
                "Token refresh failed with HTTP {}",
                response.status
            )));
        }

        let payload: RefreshResponse = serde_json::from_value(response.body)
            .map_err(|e| AppError::auth(format!("Token refresh response was malformed: {e}")))?;
        Ok(payload.access)
    }
}

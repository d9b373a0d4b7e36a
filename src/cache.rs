// ABOUTME: In-memory TTL cache with lazy eviction and a periodic background sweep
// ABOUTME: Tracks hit/miss statistics and owns the sweep task's lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # TTL Cache
//!
//! Stores JSON payloads with a bounded lifetime. Correctness comes from lazy
//! eviction (an expired entry is never returned), while a periodic sweep
//! bounds memory growth from entries that are set but never read again.
//!
//! Construction spawns the sweep task, so a [`TtlCache`] must be created
//! inside a Tokio runtime. The task is aborted by [`TtlCache::destroy`] and
//! on drop; it never keeps the process alive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::constants::{CACHE_SWEEP_INTERVAL, DEFAULT_CACHE_TTL};

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    /// An entry is expired from exactly `expires_at` onward.
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// Read-only snapshot of cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of `get` calls that returned a live entry.
    pub hits: u64,
    /// Number of `get` calls that found nothing (or an expired entry).
    pub misses: u64,
    /// Current number of stored entries.
    pub size: usize,
}

/// In-memory key/value cache with per-entry expiry.
pub struct TtlCache {
    state: Arc<Mutex<CacheState>>,
    sweeper: StdMutex<Option<JoinHandle<()>>>,
}

impl TtlCache {
    /// Create a cache sweeping on the default 10 minute interval.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sweep_interval(CACHE_SWEEP_INTERVAL)
    }

    /// Create a cache with a custom sweep interval.
    #[must_use]
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        let state = Arc::new(Mutex::new(CacheState::default()));
        let sweeper = Self::spawn_sweeper(Arc::clone(&state), sweep_interval);
        Self {
            state,
            sweeper: StdMutex::new(Some(sweeper)),
        }
    }

    fn spawn_sweeper(state: Arc<Mutex<CacheState>>, period: Duration) -> JoinHandle<()> {
        let first_tick = Instant::now() + period;
        tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            loop {
                ticker.tick().await;
                let now = Instant::now();
                let mut guard = state.lock().await;
                let before = guard.entries.len();
                guard.entries.retain(|_, entry| !entry.is_expired(now));
                let removed = before - guard.entries.len();
                if removed > 0 {
                    debug!(removed, remaining = guard.entries.len(), "cache sweep");
                }
            }
        })
    }

    /// Fetch a live value, lazily evicting it if it has expired.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        if let Some(entry) = state.entries.get(key) {
            if entry.is_expired(now) {
                state.entries.remove(key);
                state.misses += 1;
                return None;
            }
            let value = entry.value.clone();
            state.hits += 1;
            return Some(value);
        }
        state.misses += 1;
        None
    }

    /// Store a value, overwriting any existing entry. `None` applies the
    /// default TTL of one hour.
    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let expires_at = Instant::now() + ttl.unwrap_or(DEFAULT_CACHE_TTL);
        let mut state = self.state.lock().await;
        state.entries.insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Whether a live entry exists. Evicts expired entries like `get`, but
    /// never touches the hit/miss counters.
    pub async fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        if let Some(entry) = state.entries.get(key) {
            if entry.is_expired(now) {
                state.entries.remove(key);
                return false;
            }
            return true;
        }
        false
    }

    /// Remove an entry, reporting whether one was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.state.lock().await.entries.remove(key).is_some()
    }

    /// Remove every entry and reset statistics.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }

    /// Snapshot the current statistics.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            size: state.entries.len(),
        }
    }

    /// Cancel the sweep task and drop all state. Idempotent.
    pub async fn destroy(&self) {
        self.abort_sweeper();
        self.clear().await;
    }

    fn abort_sweeper(&self) {
        if let Ok(mut guard) = self.sweeper.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TtlCache {
    fn drop(&mut self) {
        self.abort_sweeper();
    }
}

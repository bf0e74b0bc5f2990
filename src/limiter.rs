// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for form submission endpoints.
//!
//! Each identifier (conventionally `"<form>:<client-ip>"`) may make
//! `max_requests` requests per window. The window starts at the first
//! request and resets once it has fully elapsed.
//!
//! State lives behind the [`RateLimitStore`] trait. The bundled
//! [`MemoryStore`] is process-local: every instance of the service keeps
//! its own counters and a restart clears them.

use crate::config::RateLimitConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
    },
    /// Request is rate limited
    Limited {
        /// Time until the current window ends
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }

    /// Whole seconds a limited caller should wait, rounded up and never zero.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            RateLimitResult::Allowed { .. } => None,
            RateLimitResult::Limited { retry_after } => {
                let secs = retry_after
                    .as_secs()
                    .saturating_add(u64::from(retry_after.subsec_nanos() > 0));
                Some(secs.max(1))
            }
        }
    }
}

/// Request count for one identifier in its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests observed in the current window, always >= 1
    pub count: u32,
    /// When the current window began
    pub window_start: Instant,
}

/// Fixed-window policy: the pure decision half of the limiter.
#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    /// Maximum requests per identifier per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
    /// Table size above which expired entries are swept
    pub sweep_threshold: usize,
}

impl Default for FixedWindow {
    fn default() -> Self {
        Self::from(&RateLimitConfig::default())
    }
}

impl From<&RateLimitConfig> for FixedWindow {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window_duration(),
            sweep_threshold: config.sweep_threshold,
        }
    }
}

impl FixedWindow {
    /// An entry is expired once strictly more than one window has passed.
    pub fn is_expired(&self, entry: &RateLimitEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.window_start) > self.window
    }

    /// Apply one request to an identifier's slot.
    ///
    /// An empty or expired slot starts a fresh window with a count of one.
    /// A slot under the limit is incremented. A full slot is left untouched
    /// and the caller is told how long remains in the window.
    pub fn admit(&self, slot: &mut Option<RateLimitEntry>, now: Instant) -> RateLimitResult {
        if let Some(entry) = slot.as_mut().filter(|e| !self.is_expired(e, now)) {
            if entry.count < self.max_requests {
                entry.count += 1;
                return RateLimitResult::Allowed {
                    remaining: self.max_requests - entry.count,
                };
            }
            let retry_after = entry
                .window_start
                .checked_add(self.window)
                .map_or(self.window, |end| end.saturating_duration_since(now));
            return RateLimitResult::Limited { retry_after };
        }

        *slot = Some(RateLimitEntry {
            count: 1,
            window_start: now,
        });
        RateLimitResult::Allowed {
            remaining: self.max_requests.saturating_sub(1),
        }
    }
}

/// Storage for per-identifier window state.
///
/// Implementations apply the policy to one identifier as a single step so
/// a backend shared between instances can make the update atomic.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record one request for `identifier` and return the decision.
    async fn apply(&self, identifier: &str, policy: &FixedWindow, now: Instant)
        -> RateLimitResult;

    /// Remove every entry whose window has expired. Returns how many were removed.
    async fn sweep(&self, policy: &FixedWindow, now: Instant) -> usize;

    /// Number of tracked identifiers.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Process-local store backed by a map.
///
/// When the map grows past the policy's sweep threshold, expired entries
/// are evicted before the next request is applied. Entries inside an active
/// window are never evicted, so the map can overshoot the threshold.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, RateLimitEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one identifier's entry.
    pub async fn get(&self, identifier: &str) -> Option<RateLimitEntry> {
        self.entries.read().await.get(identifier).copied()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn apply(
        &self,
        identifier: &str,
        policy: &FixedWindow,
        now: Instant,
    ) -> RateLimitResult {
        let mut entries = self.entries.write().await;

        if entries.len() > policy.sweep_threshold {
            let before = entries.len();
            entries.retain(|_, entry| !policy.is_expired(entry, now));
            debug!(
                evicted = before - entries.len(),
                remaining = entries.len(),
                "Swept expired rate limit entries"
            );
        }

        let mut slot = entries.get(identifier).copied();
        let result = policy.admit(&mut slot, now);
        if let Some(entry) = slot {
            entries.insert(identifier.to_string(), entry);
        }
        result
    }

    async fn sweep(&self, policy: &FixedWindow, now: Instant) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !policy.is_expired(entry, now));
        before - entries.len()
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Rate limiter facade used by the HTTP handlers.
#[derive(Clone)]
pub struct RateLimiter {
    policy: FixedWindow,
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    /// Create a rate limiter with an in-memory store.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Create a rate limiter over an explicit store.
    pub fn with_store(config: RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            policy: FixedWindow::from(&config),
            store,
        }
    }

    pub fn policy(&self) -> &FixedWindow {
        &self.policy
    }

    /// Count one request against `identifier`.
    pub async fn check(&self, identifier: &str) -> RateLimitResult {
        let result = self.store.apply(identifier, &self.policy, Instant::now()).await;

        match result {
            RateLimitResult::Allowed { remaining } => {
                debug!(identifier, remaining, "Request within rate limit");
            }
            RateLimitResult::Limited { retry_after } => {
                warn!(identifier, ?retry_after, "Rate limit exceeded");
            }
        }

        result
    }

    /// Evict expired entries regardless of table size.
    pub async fn cleanup(&self) -> usize {
        self.store.sweep(&self.policy, Instant::now()).await
    }

    /// Number of identifiers currently tracked.
    pub async fn tracked(&self) -> usize {
        self.store.len().await
    }
}

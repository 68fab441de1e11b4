// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the intake endpoints.
//!
//! Each client address gets a window that opens on its first request and
//! admits `max_requests` submissions until it closes. Counters live in
//! process memory only.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Request count for one client inside the current window.
#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self { started: now, count: 0 }
    }

    fn is_expired(&self, now: Instant, length: Duration) -> bool {
        now.duration_since(self.started) >= length
    }

    fn reset_in(&self, now: Instant, length: Duration) -> Duration {
        (self.started + length).saturating_duration_since(now)
    }
}

/// Thread-safe rate limiter.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-IP windows
    windows: Arc<RwLock<HashMap<IpAddr, Window>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Count a request from `ip` and decide whether it may proceed.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        let now = Instant::now();
        let length = self.config.window_duration();

        let mut windows = self.windows.write().await;
        let window = windows.entry(ip).or_insert_with(|| Window::new(now));

        if window.is_expired(now, length) {
            *window = Window::new(now);
        }

        let reset_in = window.reset_in(now, length);

        if window.count >= self.config.max_requests {
            debug!(%ip, ?reset_in, "Client rate limit exceeded");
            return RateLimitResult::Limited {
                retry_after: reset_in,
            };
        }

        window.count += 1;
        RateLimitResult::Allowed {
            remaining: self.config.max_requests - window.count,
            reset_in,
        }
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }

    /// Drop windows that have closed (should be called periodically).
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let length = self.config.window_duration();

        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, window| !window.is_expired(now, length));

        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, "Pruned expired rate windows");
        }
    }
}

//! In-memory sliding-window rate limiter.
//!
//! State is process-local: it resets on restart and is not shared between
//! server instances. Each key's timestamp queue sits behind its own `DashMap`
//! shard lock, so concurrent requests for the same key serialize.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Rejected; the oldest counted call leaves the window after `retry_after`.
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

/// Per-key sliding-window counter.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call for `key` unless `limit` calls already happened within
    /// `window`. Rejected calls are not recorded.
    pub fn allow(&self, key: &str, limit: usize, window: Duration) -> bool {
        self.check_at(key, limit, window, Instant::now()).is_allowed()
    }

    /// [`allow`](Self::allow) against an explicit clock.
    pub fn allow_at(&self, key: &str, limit: usize, window: Duration, now: Instant) -> bool {
        self.check_at(key, limit, window, now).is_allowed()
    }

    /// Like [`allow`](Self::allow) but reports how long to wait when limited.
    pub fn check(&self, key: &str, limit: usize, window: Duration) -> RateLimitDecision {
        self.check_at(key, limit, window, Instant::now())
    }

    pub fn check_at(
        &self,
        key: &str,
        limit: usize,
        window: Duration,
        now: Instant,
    ) -> RateLimitDecision {
        let mut stamps = self.windows.entry(key.to_string()).or_default();

        while let Some(oldest) = stamps.front() {
            if now.saturating_duration_since(*oldest) >= window {
                stamps.pop_front();
            } else {
                break;
            }
        }

        if stamps.len() >= limit {
            let retry_after = stamps
                .front()
                .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(window);
            return RateLimitDecision::Limited { retry_after };
        }

        stamps.push_back(now);
        RateLimitDecision::Allowed
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Drop keys whose newest call is older than `window`.
    pub fn cleanup_at(&self, window: Duration, now: Instant) {
        self.windows.retain(|_, stamps| {
            stamps
                .back()
                .is_some_and(|newest| now.saturating_duration_since(*newest) < window)
        });
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(
        self: &Arc<Self>,
        window: Duration,
        every: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                limiter.cleanup_at(window, Instant::now());
            }
        })
    }
}

//! In-memory fixed-window rate limiter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::{Result, SaleError};
use crate::providers::{RateDecision, RateLimiter};

#[derive(Debug)]
struct Window {
    count: u64,
    expires_at: Instant,
}

/// Mutex-guarded [`RateLimiter`] with the same fixed-window semantics as
/// the Redis implementation: the first request in a window creates the
/// counter and starts its expiry.
///
/// Expired windows are dropped when their key is touched again; call
/// [`reset`](RateLimiter::reset) in long-running tests that churn through
/// many keys.
#[derive(Debug, Clone, Default)]
pub struct MemoryRateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl MemoryRateLimiter {
    /// Create an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Window>>> {
        self.windows.lock().map_err(|_| SaleError::StoreUnavailable {
            reason: "rate limiter mutex poisoned".to_string(),
        })
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn check_and_record(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
    ) -> Result<RateDecision> {
        let mut windows = self.lock()?;
        let now = Instant::now();

        let entry = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            expires_at: now + window,
        });
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + window;
        }
        entry.count += 1;

        if entry.count > u64::from(max_requests) {
            Ok(RateDecision::Limited)
        } else {
            Ok(RateDecision::Allowed)
        }
    }

    async fn attempts(&self, key: &str) -> Result<u64> {
        let windows = self.lock()?;
        let now = Instant::now();
        Ok(windows
            .get(key)
            .filter(|window| window.expires_at > now)
            .map_or(0, |window| window.count))
    }

    async fn reset(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_the_ceiling() {
        let limiter = MemoryRateLimiter::new();
        for _ in 0..3 {
            let decision = limiter
                .check_and_record("k", 3, Duration::from_secs(60))
                .await
                .unwrap();
            assert_eq!(decision, RateDecision::Allowed);
        }
    }

    #[tokio::test]
    async fn limits_past_the_ceiling() {
        let limiter = MemoryRateLimiter::new();
        for _ in 0..3 {
            limiter
                .check_and_record("k", 3, Duration::from_secs(60))
                .await
                .unwrap();
        }
        let decision = limiter
            .check_and_record("k", 3, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(decision, RateDecision::Limited);
    }

    #[tokio::test]
    async fn windows_expire() {
        let limiter = MemoryRateLimiter::new();
        limiter
            .check_and_record("k", 1, Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        let decision = limiter
            .check_and_record("k", 1, Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(decision, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = MemoryRateLimiter::new();
        limiter
            .check_and_record("a", 1, Duration::from_secs(60))
            .await
            .unwrap();
        let decision = limiter
            .check_and_record("b", 1, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(decision, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn reset_clears_the_counter() {
        let limiter = MemoryRateLimiter::new();
        for _ in 0..2 {
            limiter
                .check_and_record("k", 1, Duration::from_secs(60))
                .await
                .unwrap();
        }
        limiter.reset("k").await.unwrap();
        assert_eq!(limiter.attempts("k").await.unwrap(), 0);
    }
}

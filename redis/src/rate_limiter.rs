//! Redis-backed fixed-window rate limiter.
//!
//! # Algorithm
//!
//! Fixed windows with plain counters:
//! 1. INCR the scope key (creates it at 1 on first use)
//! 2. EXPIRE ... NX starts the window's TTL on that first use
//! 3. Compare the count against the ceiling
//!
//! Both commands run in one atomic pipeline so two concurrent first
//! requests cannot leave the counter without an expiry.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;

use flashsale_core::error::{Result, SaleError};
use flashsale_core::providers::{RateDecision, RateLimiter};

/// Redis-backed [`RateLimiter`] using fixed expiry windows.
#[derive(Clone)]
pub struct RedisRateLimiter {
    /// Connection manager for connection pooling.
    conn: ConnectionManager,
}

impl RedisRateLimiter {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns [`SaleError::StoreUnavailable`] if the connection fails.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|err| unavailable("failed to create Redis client", &err))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|err| unavailable("failed to connect to Redis", &err))?;
        Ok(Self { conn })
    }
}

fn unavailable(context: &str, err: &redis::RedisError) -> SaleError {
    SaleError::StoreUnavailable {
        reason: format!("{context}: {err}"),
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check_and_record(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
    ) -> Result<RateDecision> {
        let mut conn = self.conn.clone();
        let window_secs = window.as_secs().max(1);

        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(key, 1) // Return: count including this request
            .cmd("EXPIRE")
            .arg(key)
            .arg(window_secs)
            .arg("NX") // Only the first request starts the window
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|err| unavailable("failed to count request", &err))?;

        if count > u64::from(max_requests) {
            tracing::debug!(key, count, max_requests, "Rate ceiling exceeded");
            Ok(RateDecision::Limited)
        } else {
            Ok(RateDecision::Allowed)
        }
    }

    async fn attempts(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let count: Option<u64> = conn
            .get(key)
            .await
            .map_err(|err| unavailable("failed to read counter", &err))?;
        Ok(count.unwrap_or(0))
    }

    async fn reset(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(key)
            .await
            .map_err(|err| unavailable("failed to reset counter", &err))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Note: these tests require a running Redis instance.
    // Run with: docker run -d -p 6379:6379 redis:7-alpine

    const REDIS_URL: &str = "redis://127.0.0.1:6379";

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn allows_within_the_ceiling() {
        let limiter = RedisRateLimiter::connect(REDIS_URL).await.unwrap();
        let key = format!("test:allow:{}", uuid::Uuid::new_v4());

        for i in 1..=5 {
            let decision = limiter
                .check_and_record(&key, 5, Duration::from_secs(60))
                .await
                .unwrap();
            assert_eq!(decision, RateDecision::Allowed, "request {i} should pass");
        }

        limiter.reset(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn limits_past_the_ceiling() {
        let limiter = RedisRateLimiter::connect(REDIS_URL).await.unwrap();
        let key = format!("test:block:{}", uuid::Uuid::new_v4());

        for _ in 0..3 {
            limiter
                .check_and_record(&key, 3, Duration::from_secs(60))
                .await
                .unwrap();
        }
        let decision = limiter
            .check_and_record(&key, 3, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(decision, RateDecision::Limited);

        limiter.reset(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn windows_expire() {
        let limiter = RedisRateLimiter::connect(REDIS_URL).await.unwrap();
        let key = format!("test:expire:{}", uuid::Uuid::new_v4());

        limiter
            .check_and_record(&key, 1, Duration::from_secs(1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let decision = limiter
            .check_and_record(&key, 1, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(decision, RateDecision::Allowed);

        limiter.reset(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn reset_clears_the_counter() {
        let limiter = RedisRateLimiter::connect(REDIS_URL).await.unwrap();
        let key = format!("test:reset:{}", uuid::Uuid::new_v4());

        for _ in 0..5 {
            limiter
                .check_and_record(&key, 5, Duration::from_secs(60))
                .await
                .unwrap();
        }
        limiter.reset(&key).await.unwrap();

        assert_eq!(limiter.attempts(&key).await.unwrap(), 0);
        let decision = limiter
            .check_and_record(&key, 5, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(decision, RateDecision::Allowed);

        limiter.reset(&key).await.unwrap();
    }
}

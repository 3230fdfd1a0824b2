//! Rate limiter contract for the admission guards.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The request fits inside the window ceiling.
    Allowed,
    /// The ceiling is exceeded for the rest of the window.
    Limited,
}

/// Fixed-window request counter keyed by an arbitrary scope string
/// (user id, source address + window).
///
/// Counters are created lazily by the first request in a window and expire
/// automatically. A store failure is reported as an error rather than a
/// decision: the guards decide whether to fail open.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request against `key` and decide, in one atomic step.
    ///
    /// The first request in a window creates the counter and starts its
    /// expiry; the decision is `Limited` once the count exceeds
    /// `max_requests`.
    ///
    /// # Errors
    ///
    /// Counter-store connectivity failures. Callers choose their own
    /// degradation (the admission guards fail open).
    async fn check_and_record(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
    ) -> Result<RateDecision>;

    /// Current count for `key`; zero when absent or expired.
    ///
    /// # Errors
    ///
    /// Counter-store connectivity failures.
    async fn attempts(&self, key: &str) -> Result<u64>;

    /// Clear the counter for `key` (administrative reset).
    ///
    /// # Errors
    ///
    /// Counter-store connectivity failures.
    async fn reset(&self, key: &str) -> Result<()>;
}

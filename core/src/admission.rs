//! Admission guards: the gates in front of the purchase path.
//!
//! Three independent gates run in order — sale-window gate, per-user
//! attempt ceiling, per-source rate ceiling — so abusive or excess load is
//! shed before it reaches the reservation primitive.
//!
//! The rate-limit gates FAIL OPEN: when their counter store is unreachable
//! the request passes through rather than blocking all traffic on a
//! secondary outage. The reservation path itself fails closed on the same
//! class of outage; that asymmetry is deliberate (availability over strict
//! attempt-limiting, correctness over availability for stock).

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SaleError};
use crate::lifecycle::SaleSchedule;
use crate::providers::{RateDecision, RateLimiter};
use crate::types::{SaleStatus, UserId};

/// Key prefix for per-user attempt counters.
const USER_ATTEMPT_KEY_PREFIX: &str = "flash_sale:attempts:";
/// Key prefix for per-source request counters.
const SOURCE_KEY_PREFIX: &str = "flash_sale:source:";

/// A fixed-window request ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    /// Maximum requests admitted inside one window.
    pub limit: u32,
    /// Window length.
    pub window: Duration,
}

/// Tunable guard ceilings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionPolicy {
    /// Per-user attempt ceiling across the whole sale window.
    pub max_attempts_per_user: u32,
    /// Short per-source burst window.
    pub source_burst: RateWindow,
    /// Longer per-source sustained window. Overlaps the burst window;
    /// exceeding either rejects.
    pub source_sustained: RateWindow,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_attempts_per_user: 3,
            source_burst: RateWindow {
                limit: 10,
                window: Duration::from_secs(1),
            },
            source_sustained: RateWindow {
                limit: 50,
                window: Duration::from_secs(10),
            },
        }
    }
}

/// Layered admission guards composed in front of the purchase orchestrator.
pub struct AdmissionGuards {
    schedule: SaleSchedule,
    limiter: Arc<dyn RateLimiter>,
    policy: AdmissionPolicy,
}

impl AdmissionGuards {
    /// Wire the guards against a schedule, a rate-limit counter store, and
    /// a policy.
    #[must_use]
    pub fn new(
        schedule: SaleSchedule,
        limiter: Arc<dyn RateLimiter>,
        policy: AdmissionPolicy,
    ) -> Self {
        Self {
            schedule,
            limiter,
            policy,
        }
    }

    /// Run every gate against one inbound purchase request.
    ///
    /// # Errors
    ///
    /// [`SaleError::SaleNotStarted`] / [`SaleError::SaleEnded`] outside the
    /// sale window, [`SaleError::TooManyAttempts`] past the per-user
    /// ceiling, [`SaleError::RateLimited`] past either per-source window.
    /// Limiter-store outages never surface here; those gates fail open.
    pub async fn admit(&self, user: &UserId, source: IpAddr) -> Result<()> {
        match self.schedule.status() {
            SaleStatus::Upcoming => return Err(SaleError::SaleNotStarted),
            SaleStatus::Ended => return Err(SaleError::SaleEnded),
            SaleStatus::Active => {}
        }

        self.check_user_attempts(user).await?;
        self.check_source(source).await
    }

    async fn check_user_attempts(&self, user: &UserId) -> Result<()> {
        let key = format!("{USER_ATTEMPT_KEY_PREFIX}{user}");
        let max_attempts = self.policy.max_attempts_per_user;
        match self
            .limiter
            .check_and_record(&key, max_attempts, self.schedule.attempt_window())
            .await
        {
            Ok(RateDecision::Allowed) => Ok(()),
            Ok(RateDecision::Limited) => {
                tracing::warn!(
                    user_id = %user,
                    max_attempts,
                    "Purchase attempt ceiling exceeded"
                );
                Err(SaleError::TooManyAttempts { max_attempts })
            }
            Err(err) => {
                // Fail open: a limiter outage must not block all traffic.
                tracing::warn!(
                    user_id = %user,
                    error = %err,
                    "Attempt limiter unreachable, admitting request"
                );
                Ok(())
            }
        }
    }

    async fn check_source(&self, source: IpAddr) -> Result<()> {
        for rate in [self.policy.source_burst, self.policy.source_sustained] {
            let key = format!("{SOURCE_KEY_PREFIX}{}s:{source}", rate.window.as_secs());
            match self
                .limiter
                .check_and_record(&key, rate.limit, rate.window)
                .await
            {
                Ok(RateDecision::Allowed) => {}
                Ok(RateDecision::Limited) => {
                    tracing::warn!(
                        %source,
                        limit = rate.limit,
                        window_secs = rate.window.as_secs(),
                        "Source rate ceiling exceeded"
                    );
                    return Err(SaleError::RateLimited);
                }
                Err(err) => {
                    tracing::warn!(
                        %source,
                        error = %err,
                        "Source limiter unreachable, admitting request"
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryRateLimiter;
    use async_trait::async_trait;
    use chrono::{TimeDelta, Utc};

    /// Limiter double whose store is always down.
    struct UnreachableLimiter;

    #[async_trait]
    impl RateLimiter for UnreachableLimiter {
        async fn check_and_record(
            &self,
            _key: &str,
            _max_requests: u32,
            _window: Duration,
        ) -> Result<RateDecision> {
            Err(SaleError::StoreUnavailable {
                reason: "connection refused".to_string(),
            })
        }

        async fn attempts(&self, _key: &str) -> Result<u64> {
            Err(SaleError::StoreUnavailable {
                reason: "connection refused".to_string(),
            })
        }

        async fn reset(&self, _key: &str) -> Result<()> {
            Err(SaleError::StoreUnavailable {
                reason: "connection refused".to_string(),
            })
        }
    }

    fn active_schedule() -> SaleSchedule {
        let now = Utc::now();
        SaleSchedule::new(now - TimeDelta::minutes(5), now + TimeDelta::minutes(55), 100)
    }

    fn guards(schedule: SaleSchedule, policy: AdmissionPolicy) -> AdmissionGuards {
        AdmissionGuards::new(schedule, Arc::new(MemoryRateLimiter::new()), policy)
    }

    fn ip() -> IpAddr {
        "127.0.0.1".parse().unwrap()
    }

    #[tokio::test]
    async fn rejects_before_the_sale_starts() {
        let now = Utc::now();
        let schedule = SaleSchedule::new(now + TimeDelta::hours(1), now + TimeDelta::hours(2), 100);
        let guards = guards(schedule, AdmissionPolicy::default());
        let user = UserId::new("early-bird").unwrap();

        assert_eq!(guards.admit(&user, ip()).await, Err(SaleError::SaleNotStarted));
    }

    #[tokio::test]
    async fn rejects_after_the_sale_ends() {
        let now = Utc::now();
        let schedule = SaleSchedule::new(now - TimeDelta::hours(2), now - TimeDelta::hours(1), 100);
        let guards = guards(schedule, AdmissionPolicy::default());
        let user = UserId::new("latecomer").unwrap();

        assert_eq!(guards.admit(&user, ip()).await, Err(SaleError::SaleEnded));
    }

    #[tokio::test]
    async fn enforces_the_per_user_attempt_ceiling() {
        let guards = guards(active_schedule(), AdmissionPolicy::default());
        let user = UserId::new("spammer").unwrap();

        for _ in 0..3 {
            guards.admit(&user, ip()).await.unwrap();
        }
        assert_eq!(
            guards.admit(&user, ip()).await,
            Err(SaleError::TooManyAttempts { max_attempts: 3 })
        );
    }

    #[tokio::test]
    async fn attempt_ceilings_are_per_user() {
        let guards = guards(active_schedule(), AdmissionPolicy::default());
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        for _ in 0..3 {
            guards.admit(&alice, ip()).await.unwrap();
        }
        assert!(guards.admit(&bob, ip()).await.is_ok());
    }

    #[tokio::test]
    async fn enforces_the_source_burst_window() {
        let policy = AdmissionPolicy {
            max_attempts_per_user: 100,
            source_burst: RateWindow {
                limit: 3,
                window: Duration::from_secs(60),
            },
            ..AdmissionPolicy::default()
        };
        let guards = guards(active_schedule(), policy);

        for i in 0..3 {
            let user = UserId::new(format!("buyer-{i}")).unwrap();
            guards.admit(&user, ip()).await.unwrap();
        }
        let user = UserId::new("buyer-3").unwrap();
        assert_eq!(guards.admit(&user, ip()).await, Err(SaleError::RateLimited));
    }

    #[tokio::test]
    async fn source_windows_are_keyed_by_address() {
        let policy = AdmissionPolicy {
            max_attempts_per_user: 100,
            source_burst: RateWindow {
                limit: 1,
                window: Duration::from_secs(60),
            },
            ..AdmissionPolicy::default()
        };
        let guards = guards(active_schedule(), policy);
        let user = UserId::new("shared-account").unwrap();

        guards.admit(&user, "10.0.0.1".parse().unwrap()).await.unwrap();
        assert!(guards.admit(&user, "10.0.0.2".parse().unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn fails_open_when_the_limiter_store_is_down() {
        let guards = AdmissionGuards::new(
            active_schedule(),
            Arc::new(UnreachableLimiter),
            AdmissionPolicy::default(),
        );
        let user = UserId::new("buyer").unwrap();

        // Every gate's dependency is down; the request still passes.
        for _ in 0..10 {
            guards.admit(&user, ip()).await.unwrap();
        }
    }
}

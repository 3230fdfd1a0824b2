//! Sale lifecycle: a pure function of wall-clock time.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::types::SaleStatus;

/// Fallback attempt window when the configured sale window is degenerate.
const DEFAULT_ATTEMPT_WINDOW: Duration = Duration::from_secs(3600);

/// Immutable sale window configuration.
///
/// Loaded once at startup and never mutated at runtime. Distinct from the
/// mutable stock counter it seeds: the schedule answers "when", the
/// reservation store answers "how many are left".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleSchedule {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    total_stock: i64,
}

impl SaleSchedule {
    /// Create a schedule from the configured instants and stock quantity.
    #[must_use]
    pub const fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>, total_stock: i64) -> Self {
        Self {
            starts_at,
            ends_at,
            total_stock,
        }
    }

    /// Configured start instant.
    #[must_use]
    pub const fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// Configured end instant.
    #[must_use]
    pub const fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    /// Total stock the sale opened with.
    #[must_use]
    pub const fn total_stock(&self) -> i64 {
        self.total_stock
    }

    /// Status at an explicit instant: `Upcoming` strictly before the start,
    /// `Ended` strictly after the end, `Active` in between (both bounds
    /// inclusive). No stored state, no transition side effects; monotonic in
    /// real time.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> SaleStatus {
        if now < self.starts_at {
            SaleStatus::Upcoming
        } else if now > self.ends_at {
            SaleStatus::Ended
        } else {
            SaleStatus::Active
        }
    }

    /// Current status, recomputed on every call.
    #[must_use]
    pub fn status(&self) -> SaleStatus {
        self.status_at(Utc::now())
    }

    /// Whether purchases are currently admissible.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status() == SaleStatus::Active
    }

    /// Expiry window for per-user attempt counters: the whole sale duration,
    /// so a buyer's attempt budget spans the entire sale.
    #[must_use]
    pub fn attempt_window(&self) -> Duration {
        (self.ends_at - self.starts_at)
            .to_std()
            .unwrap_or(DEFAULT_ATTEMPT_WINDOW)
    }
}

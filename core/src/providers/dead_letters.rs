//! Parking lot for durability jobs that exhausted their retries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::DurabilityJob;

/// A durability job parked for manual inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkedJob {
    /// The job as it was last attempted.
    pub job: DurabilityJob,
    /// Error message from the final attempt.
    pub error_message: String,
    /// Number of delivery attempts made before parking.
    pub retry_count: u32,
    /// When the job was parked.
    pub parked_at: DateTime<Utc>,
}

/// Storage for jobs the persistence worker gave up on.
///
/// Parked jobs are never silently dropped; they wait here for an operator
/// to inspect and replay.
#[async_trait]
pub trait DeadLetterQueue: Send + Sync {
    /// Park a job after its retry budget is exhausted.
    ///
    /// # Errors
    ///
    /// Store failures. The worker logs the full job on a failed park so
    /// the record survives at least in the logs.
    async fn park(&self, job: &DurabilityJob, error_message: &str, retry_count: u32)
        -> Result<()>;

    /// List parked jobs awaiting inspection, oldest first.
    ///
    /// # Errors
    ///
    /// Store failures.
    async fn list_parked(&self, limit: i64) -> Result<Vec<ParkedJob>>;
}

//! Durability queue contract.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::DurabilityJob;

/// Hand-off point between the synchronous purchase path and the
/// asynchronous persistence path.
///
/// A unit is only considered sold once its durability job has been accepted
/// here; on rejection the orchestrator releases the reservation.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Accept a durability job for asynchronous processing.
    ///
    /// Must not block the purchase path; a queue that cannot accept the job
    /// immediately fails the enqueue instead.
    ///
    /// # Errors
    ///
    /// [`SaleError::QueueUnavailable`](crate::SaleError::QueueUnavailable)
    /// when the job cannot be accepted. The caller compensates by
    /// releasing the reservation.
    async fn enqueue(&self, job: DurabilityJob) -> Result<()>;
}

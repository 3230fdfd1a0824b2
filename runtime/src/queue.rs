//! Bounded in-process durability queue.

use async_trait::async_trait;
use tokio::sync::mpsc;

use flashsale_core::error::{Result, SaleError};
use flashsale_core::providers::JobQueue;
use flashsale_core::types::DurabilityJob;

/// Producer half of the durability queue.
///
/// Enqueue never blocks the purchase path: a full or closed queue is an
/// immediate enqueue failure, which the orchestrator answers by releasing
/// the reservation. Capacity is the back-pressure valve between the hot
/// path and however far the worker has fallen behind.
#[derive(Debug, Clone)]
pub struct ChannelJobQueue {
    tx: mpsc::Sender<DurabilityJob>,
}

/// Consumer half, handed to the persistence worker.
pub type JobReceiver = mpsc::Receiver<DurabilityJob>;

impl ChannelJobQueue {
    /// Create a queue bounded at `capacity` jobs.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl JobQueue for ChannelJobQueue {
    async fn enqueue(&self, job: DurabilityJob) -> Result<()> {
        self.tx.try_send(job).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => SaleError::QueueUnavailable {
                reason: "durability queue is full".to_string(),
            },
            mpsc::error::TrySendError::Closed(_) => SaleError::QueueUnavailable {
                reason: "durability queue is closed".to_string(),
            },
        })
    }
}

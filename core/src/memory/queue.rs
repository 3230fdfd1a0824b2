//! Recording job queue with switchable failure injection.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Result, SaleError};
use crate::providers::JobQueue;
use crate::types::DurabilityJob;

/// [`JobQueue`] that records enqueued jobs in memory and can be switched
/// into a rejecting mode to exercise the orchestrator's compensation path.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobQueue {
    jobs: Arc<Mutex<Vec<DurabilityJob>>>,
    rejecting: Arc<AtomicBool>,
}

impl MemoryJobQueue {
    /// Create an accepting queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch between accepting and rejecting enqueues.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// Take every job recorded so far.
    #[must_use]
    pub fn drain(&self) -> Vec<DurabilityJob> {
        self.jobs.lock().map(|mut jobs| std::mem::take(&mut *jobs)).unwrap_or_default()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, job: DurabilityJob) -> Result<()> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(SaleError::QueueUnavailable {
                reason: "durability queue rejected the job".to_string(),
            });
        }
        self.jobs
            .lock()
            .map_err(|_| SaleError::QueueUnavailable {
                reason: "durability queue mutex poisoned".to_string(),
            })?
            .push(job);
        Ok(())
    }
}

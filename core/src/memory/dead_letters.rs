//! In-memory dead letter queue.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, SaleError};
use crate::providers::{DeadLetterQueue, ParkedJob};
use crate::types::DurabilityJob;

/// Mutex-guarded [`DeadLetterQueue`] for single-process deployments and
/// worker tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDeadLetterQueue {
    parked: Arc<Mutex<Vec<ParkedJob>>>,
}

impl MemoryDeadLetterQueue {
    /// Create an empty parking lot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ParkedJob>>> {
        self.parked.lock().map_err(|_| SaleError::Database(
            "dead letter queue mutex poisoned".to_string(),
        ))
    }
}

#[async_trait]
impl DeadLetterQueue for MemoryDeadLetterQueue {
    async fn park(
        &self,
        job: &DurabilityJob,
        error_message: &str,
        retry_count: u32,
    ) -> Result<()> {
        self.lock()?.push(ParkedJob {
            job: job.clone(),
            error_message: error_message.to_string(),
            retry_count,
            parked_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_parked(&self, limit: i64) -> Result<Vec<ParkedJob>> {
        let parked = self.lock()?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(parked.iter().take(limit).cloned().collect())
    }
}

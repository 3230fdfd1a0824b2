//! Order persistence worker: drains durability jobs into the relational
//! store.
//!
//! The worker runs on its own scheduling lane, fully decoupled from the
//! purchase path — a reservation is won the moment it succeeds, however
//! long (or how many retries) persistence takes. Jobs are processed one at
//! a time; ordering between users is irrelevant because the dedup set
//! guarantees at most one job ever exists per user.

use std::sync::Arc;

use flashsale_core::error::SaleError;
use flashsale_core::providers::{DeadLetterQueue, InsertOutcome, OrderRepository};
use flashsale_core::types::DurabilityJob;

use crate::queue::JobReceiver;
use crate::retry::{retry_with_predicate, RetryPolicy};

/// Consumes durability jobs and idempotently persists confirmed orders.
pub struct PersistenceWorker {
    orders: Arc<dyn OrderRepository>,
    dead_letters: Arc<dyn DeadLetterQueue>,
    policy: RetryPolicy,
}

impl PersistenceWorker {
    /// Wire the worker against the order store and the parking lot.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        dead_letters: Arc<dyn DeadLetterQueue>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            orders,
            dead_letters,
            policy,
        }
    }

    /// Drain the queue until every producer is dropped.
    pub async fn run(self, mut jobs: JobReceiver) {
        tracing::info!("Persistence worker started");
        while let Some(job) = jobs.recv().await {
            self.process(job).await;
        }
        tracing::info!("Durability queue closed, persistence worker stopping");
    }

    /// Persist one job.
    ///
    /// A duplicate-key conflict means a previous delivery of a
    /// logically-equivalent job already persisted the order; the job
    /// completes without retrying. Transient failures retry with
    /// exponential backoff; once the budget is exhausted the job is parked
    /// for manual inspection, never silently dropped.
    async fn process(&self, job: DurabilityJob) {
        let outcome = retry_with_predicate(
            self.policy.clone(),
            || self.orders.insert_confirmed(job.order_id, &job.user_id),
            SaleError::is_transient,
        )
        .await;

        match outcome {
            Ok(InsertOutcome::Inserted) => {
                metrics::counter!("flash_sale_orders_persisted_total").increment(1);
                tracing::info!(
                    order_id = %job.order_id,
                    user_id = %job.user_id,
                    "Order persisted"
                );
            }
            Ok(InsertOutcome::Duplicate) => {
                tracing::warn!(
                    order_id = %job.order_id,
                    user_id = %job.user_id,
                    "Order already persisted, skipping"
                );
            }
            Err(err) => {
                let attempts = attempts_made(&self.policy);
                metrics::counter!("flash_sale_jobs_parked_total").increment(1);
                tracing::error!(
                    order_id = %job.order_id,
                    user_id = %job.user_id,
                    attempts,
                    error = %err,
                    "Persistence retries exhausted, parking job"
                );
                if let Err(park_err) = self
                    .dead_letters
                    .park(&job, &err.to_string(), attempts)
                    .await
                {
                    // The log line above carries the full job; this one is
                    // the signal that manual replay is required.
                    tracing::error!(
                        order_id = %job.order_id,
                        user_id = %job.user_id,
                        error = %park_err,
                        "Failed to park job; manual replay required"
                    );
                }
            }
        }
    }
}

/// Total deliveries attempted under `policy` (initial call + retries).
fn attempts_made(policy: &RetryPolicy) -> u32 {
    u32::try_from(policy.max_retries).unwrap_or(u32::MAX).saturating_add(1)
}

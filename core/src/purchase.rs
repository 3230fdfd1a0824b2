//! Purchase orchestration: the synchronous admission decision plus the
//! hand-off to the asynchronous durability path.
//!
//! The outcome is two-phase. Phase 1 — the reservation — is synchronous and
//! authoritative for "did this user win". Phase 2 — persistence — is
//! queued, retried, and idempotent by construction. If the queue hand-off
//! itself fails, phase 1 is explicitly rolled back so a unit is only
//! considered sold once its durability job has been accepted.

use std::sync::Arc;

use crate::error::{Result, SaleError};
use crate::providers::{JobQueue, OrderRepository, ReservationStore};
use crate::types::{
    DurabilityJob, OrderId, PurchaseConfirmation, PurchaseStatus, ReserveOutcome, UserId,
};

/// Message returned with a confirmed purchase.
const CONFIRMATION_MESSAGE: &str = "Purchase confirmed!";

/// Orchestrates purchase attempts and per-user status queries.
pub struct PurchaseService {
    reservations: Arc<dyn ReservationStore>,
    orders: Arc<dyn OrderRepository>,
    queue: Arc<dyn JobQueue>,
}

impl PurchaseService {
    /// Wire the orchestrator against its three seams.
    #[must_use]
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        orders: Arc<dyn OrderRepository>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            reservations,
            orders,
            queue,
        }
    }

    /// Attempt to purchase one unit for `user`.
    ///
    /// The reservation call is never retried here: retrying a
    /// `StoreUnavailable` server-side risks double-decrementing when the
    /// first attempt actually succeeded before the network error. The
    /// caller may retry safely — `try_reserve` is idempotent per user.
    ///
    /// # Errors
    ///
    /// - [`SaleError::AlreadyPurchased`] when the user already won,
    /// - [`SaleError::SoldOut`] when stock is exhausted,
    /// - [`SaleError::StoreUnavailable`] when the reservation store is
    ///   unreachable (no partial state was created),
    /// - [`SaleError::QueueUnavailable`] when the durability enqueue
    ///   failed; the reservation has been released again.
    pub async fn attempt_purchase(&self, user: &UserId) -> Result<PurchaseConfirmation> {
        match self.reservations.try_reserve(user).await? {
            ReserveOutcome::AlreadyReserved => return Err(SaleError::AlreadyPurchased),
            ReserveOutcome::SoldOut => return Err(SaleError::SoldOut),
            ReserveOutcome::Success => {}
        }

        // Generated here, not by any store, so the id is known even before
        // durable persistence.
        let order_id = OrderId::generate();
        let job = DurabilityJob {
            order_id,
            user_id: user.clone(),
        };

        if let Err(err) = self.queue.enqueue(job).await {
            tracing::error!(
                user_id = %user,
                %order_id,
                error = %err,
                "Durability enqueue failed, releasing reservation"
            );
            if let Err(release_err) = self.reservations.release(user).await {
                // The unit stays claimed until an operator intervenes; both
                // failures are in the log with full context.
                tracing::error!(
                    user_id = %user,
                    %order_id,
                    error = %release_err,
                    "Compensating release failed"
                );
            }
            return Err(err);
        }

        tracing::info!(user_id = %user, %order_id, "Purchase confirmed");
        Ok(PurchaseConfirmation {
            order_id,
            message: CONFIRMATION_MESSAGE.to_string(),
        })
    }

    /// Report whether `user` holds a reservation, and the persisted order
    /// details once the durability job has landed.
    ///
    /// The reservation store answers the authoritative "did this user win"
    /// fast path; the order row may lag behind it, in which case the
    /// response reports `purchased` with the order fields omitted.
    ///
    /// # Errors
    ///
    /// [`SaleError::StoreUnavailable`] or [`SaleError::Database`] when a
    /// backing store cannot be queried.
    pub async fn purchase_status(&self, user: &UserId) -> Result<PurchaseStatus> {
        if !self.reservations.has_reserved(user).await? {
            return Ok(PurchaseStatus::not_purchased(user.clone()));
        }

        let order = self.orders.find_by_user(user).await?;
        Ok(PurchaseStatus {
            purchased: true,
            user_id: user.clone(),
            order_id: order.as_ref().map(|order| order.id),
            purchased_at: order.map(|order| order.created_at),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::{
        MemoryJobQueue, MemoryOrderRepository, MemoryRateLimiter, MemoryReservationStore,
    };
    use crate::providers::RateLimiter;

    fn service(
        stock: i64,
    ) -> (
        PurchaseService,
        Arc<MemoryReservationStore>,
        Arc<MemoryOrderRepository>,
        Arc<MemoryJobQueue>,
    ) {
        let reservations = Arc::new(MemoryReservationStore::with_stock(stock));
        let orders = Arc::new(MemoryOrderRepository::new());
        let queue = Arc::new(MemoryJobQueue::new());
        let service = PurchaseService::new(reservations.clone(), orders.clone(), queue.clone());
        (service, reservations, orders, queue)
    }

    #[tokio::test]
    async fn confirms_a_purchase_and_enqueues_one_job() {
        let (service, reservations, _, queue) = service(5);
        let user = UserId::new("buyer").unwrap();

        let confirmation = service.attempt_purchase(&user).await.unwrap();

        assert_eq!(confirmation.message, "Purchase confirmed!");
        assert_eq!(reservations.remaining().await.unwrap(), 4);
        let jobs = queue.drain();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].order_id, confirmation.order_id);
        assert_eq!(jobs[0].user_id, user);
    }

    #[tokio::test]
    async fn rejects_a_second_purchase_by_the_same_user() {
        let (service, _, _, queue) = service(5);
        let user = UserId::new("dup").unwrap();

        service.attempt_purchase(&user).await.unwrap();
        let err = service.attempt_purchase(&user).await.unwrap_err();

        assert_eq!(err, SaleError::AlreadyPurchased);
        // No job for the duplicate attempt.
        assert_eq!(queue.drain().len(), 1);
    }

    #[tokio::test]
    async fn reports_sold_out_without_creating_a_job() {
        let (service, reservations, _, queue) = service(1);
        service
            .attempt_purchase(&UserId::new("winner").unwrap())
            .await
            .unwrap();

        let err = service
            .attempt_purchase(&UserId::new("loser").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err, SaleError::SoldOut);
        assert_eq!(reservations.remaining().await.unwrap(), 0);
        assert_eq!(queue.drain().len(), 1);
    }

    #[tokio::test]
    async fn enqueue_failure_releases_the_reservation() {
        let (service, reservations, _, queue) = service(5);
        queue.set_rejecting(true);
        let user = UserId::new("unlucky").unwrap();

        let err = service.attempt_purchase(&user).await.unwrap_err();

        assert!(matches!(err, SaleError::QueueUnavailable { .. }));
        // Compensation restored the pre-reservation state.
        assert_eq!(reservations.remaining().await.unwrap(), 5);
        assert!(!reservations.has_reserved(&user).await.unwrap());

        // The same user is eligible again once the queue recovers.
        queue.set_rejecting(false);
        assert!(service.attempt_purchase(&user).await.is_ok());
    }

    #[tokio::test]
    async fn status_reflects_the_reservation_before_persistence() {
        let (service, _, orders, queue) = service(5);
        let user = UserId::new("waiting").unwrap();
        let confirmation = service.attempt_purchase(&user).await.unwrap();

        // Durability job not yet processed: purchased, but no order fields.
        let status = service.purchase_status(&user).await.unwrap();
        assert!(status.purchased);
        assert!(status.order_id.is_none());
        assert!(status.purchased_at.is_none());

        // Simulate the worker landing the job.
        let job = queue.drain().pop().unwrap();
        orders.insert_confirmed(job.order_id, &job.user_id).await.unwrap();

        let status = service.purchase_status(&user).await.unwrap();
        assert_eq!(status.order_id, Some(confirmation.order_id));
        assert!(status.purchased_at.is_some());
    }

    #[tokio::test]
    async fn status_for_an_unknown_user_is_not_purchased() {
        let (service, _, _, _) = service(5);
        let user = UserId::new("window-shopper").unwrap();

        let status = service.purchase_status(&user).await.unwrap();

        assert!(!status.purchased);
        assert!(status.order_id.is_none());
    }

    #[tokio::test]
    async fn release_makes_a_user_eligible_again() {
        // Covers the limiter-independent part of the compensation contract:
        // release restores stock by exactly one and clears membership.
        let (service, reservations, _, _) = service(1);
        let user = UserId::new("flaky").unwrap();
        service.attempt_purchase(&user).await.unwrap();
        assert_eq!(reservations.remaining().await.unwrap(), 0);

        reservations.release(&user).await.unwrap();

        assert_eq!(reservations.remaining().await.unwrap(), 1);
        assert!(service.attempt_purchase(&user).await.is_ok());
    }

    #[tokio::test]
    async fn limiter_reset_is_independent_of_reservations() {
        // The rate-limit counters and the reservation state are separate
        // scopes; resetting one never touches the other.
        let limiter = MemoryRateLimiter::new();
        limiter
            .check_and_record("flash_sale:attempts:x", 3, std::time::Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(limiter.attempts("flash_sale:attempts:x").await.unwrap(), 1);
        limiter.reset("flash_sale:attempts:x").await.unwrap();
        assert_eq!(limiter.attempts("flash_sale:attempts:x").await.unwrap(), 0);
    }
}

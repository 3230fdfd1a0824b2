//! Atomic reservation store contract.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ReserveOutcome, UserId};

/// The single point of serialization for admission decisions.
///
/// The stock counter and the purchased-user set live behind this trait and
/// are mutated only through [`try_reserve`](Self::try_reserve) or the
/// explicit [`release`](Self::release) / [`reset`](Self::reset) paths.
///
/// # Atomicity
///
/// `try_reserve` must execute the "is this user new" check and the "is
/// stock available" check — including their rollback — as one indivisible
/// unit in the store's execution model. Checking and decrementing in two
/// client-observed round trips admits a check-then-act race: two requests
/// from a decremented-but-not-yet-marked user, or concurrent decrements
/// past zero. The contract is identical whether the store is a
/// mutex-guarded in-memory structure (single instance) or a networked
/// store executing a server-side script (multiple instances).
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Atomically claim one unit of stock for `user`.
    ///
    /// Adds the user to the purchased set; if already present, returns
    /// [`ReserveOutcome::AlreadyReserved`] without touching the counter.
    /// Otherwise decrements the counter; a negative result undoes both
    /// writes inside the same unit and returns
    /// [`ReserveOutcome::SoldOut`].
    ///
    /// # Errors
    ///
    /// [`SaleError::StoreUnavailable`](crate::SaleError::StoreUnavailable)
    /// when the store cannot be reached or times out. Callers must not
    /// assume the reservation happened; a retried call for a user who
    /// actually won returns `AlreadyReserved`, never a second `Success`.
    async fn try_reserve(&self, user: &UserId) -> Result<ReserveOutcome>;

    /// Compensating release: restore one unit and remove `user` from the
    /// purchased set. Used only by the orchestrator's rollback path, never
    /// by normal flow.
    ///
    /// # Errors
    ///
    /// Store connectivity failures.
    async fn release(&self, user: &UserId) -> Result<()>;

    /// Remaining stock. An absent counter reads as zero.
    ///
    /// # Errors
    ///
    /// Store connectivity failures.
    async fn remaining(&self) -> Result<i64>;

    /// Whether `user` already holds a successful reservation.
    ///
    /// # Errors
    ///
    /// Store connectivity failures.
    async fn has_reserved(&self, user: &UserId) -> Result<bool>;

    /// Seed the stock counter, taking effect only when the counter is
    /// absent. Returns `true` when this call did the seeding.
    ///
    /// # Errors
    ///
    /// Store connectivity failures.
    async fn initialize(&self, total_stock: i64) -> Result<bool>;

    /// Administrative reset: unconditionally overwrite the counter and
    /// clear the purchased set. Test/ops path only.
    ///
    /// # Errors
    ///
    /// Store connectivity failures.
    async fn reset(&self, total_stock: i64) -> Result<()>;

    /// Connectivity probe for health reporting.
    ///
    /// # Errors
    ///
    /// Store connectivity failures.
    async fn ping(&self) -> Result<()>;
}

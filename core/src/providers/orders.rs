//! Durable order repository contract.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Order, OrderId, UserId};

/// Result of an idempotent order insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The order row was written.
    Inserted,
    /// A logically-equivalent job was already persisted for this user;
    /// the write is satisfied, not failed.
    Duplicate,
}

/// Repository for confirmed orders.
///
/// The relational store owns the durable record and is authoritative only
/// for *persisted* confirmation; it lags the reservation decision by the
/// asynchronous durability path. Rows are written exclusively by the
/// persistence worker, with the uniqueness constraint on the user id as the
/// sole concurrency-control mechanism.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a confirmed order for `user`.
    ///
    /// A uniqueness conflict on the user id maps to
    /// [`InsertOutcome::Duplicate`] — a previous delivery already persisted
    /// the order — and must not be treated as a failure.
    ///
    /// # Errors
    ///
    /// [`SaleError::Database`](crate::SaleError::Database) on anything
    /// other than a uniqueness conflict; the worker retries those with
    /// backoff.
    async fn insert_confirmed(&self, order_id: OrderId, user: &UserId) -> Result<InsertOutcome>;

    /// Look up the persisted order for `user`, if the durability job has
    /// landed. `None` is a normal transient state for a reserved user.
    ///
    /// # Errors
    ///
    /// [`SaleError::Database`](crate::SaleError::Database) on query
    /// failures.
    async fn find_by_user(&self, user: &UserId) -> Result<Option<Order>>;

    /// Connectivity probe for health reporting.
    ///
    /// # Errors
    ///
    /// [`SaleError::Database`](crate::SaleError::Database) on connection
    /// failures.
    async fn ping(&self) -> Result<()>;
}

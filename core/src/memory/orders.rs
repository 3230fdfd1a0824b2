//! In-memory order repository keyed by user id.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, SaleError};
use crate::providers::{InsertOutcome, OrderRepository};
use crate::types::{Order, OrderId, OrderStatus, UserId};

/// Mutex-guarded [`OrderRepository`]. The map key is the user id, which is
/// what makes the insert naturally idempotent — the same guarantee the
/// PostgreSQL UNIQUE constraint provides.
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderRepository {
    orders: Arc<Mutex<HashMap<String, Order>>>,
}

impl MemoryOrderRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted orders.
    ///
    /// # Errors
    ///
    /// Mutex poisoning only.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether no order has been persisted yet.
    ///
    /// # Errors
    ///
    /// Mutex poisoning only.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Order>>> {
        self.orders.lock().map_err(|_| SaleError::Database(
            "order repository mutex poisoned".to_string(),
        ))
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn insert_confirmed(&self, order_id: OrderId, user: &UserId) -> Result<InsertOutcome> {
        let mut orders = self.lock()?;
        if orders.contains_key(user.as_str()) {
            return Ok(InsertOutcome::Duplicate);
        }
        orders.insert(
            user.as_str().to_string(),
            Order {
                id: order_id,
                user_id: user.clone(),
                status: OrderStatus::Confirmed,
                created_at: Utc::now(),
            },
        );
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_user(&self, user: &UserId) -> Result<Option<Order>> {
        Ok(self.lock()?.get(user.as_str()).cloned())
    }

    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_is_idempotent_per_user() {
        let repo = MemoryOrderRepository::new();
        let user = UserId::new("buyer").unwrap();
        let first = OrderId::generate();
        let second = OrderId::generate();

        assert_eq!(
            repo.insert_confirmed(first, &user).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            repo.insert_confirmed(second, &user).await.unwrap(),
            InsertOutcome::Duplicate
        );

        // The first write is the one that sticks.
        let order = repo.find_by_user(&user).await.unwrap().unwrap();
        assert_eq!(order.id, first);
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn find_returns_none_until_persisted() {
        let repo = MemoryOrderRepository::new();
        let user = UserId::new("buyer").unwrap();
        assert!(repo.find_by_user(&user).await.unwrap().is_none());
    }
}

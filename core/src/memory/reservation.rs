//! In-memory reservation store behind a single mutex.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, SaleError};
use crate::providers::ReservationStore;
use crate::types::{ReserveOutcome, UserId};

#[derive(Debug, Default)]
struct Inner {
    stock: i64,
    purchased: HashSet<String>,
    initialized: bool,
}

/// Mutex-guarded [`ReservationStore`].
///
/// The mutex is the single serialization point: the dedup check, the stock
/// decrement, and their rollback happen inside one critical section,
/// mirroring the Redis store's server-side script.
#[derive(Debug, Clone, Default)]
pub struct MemoryReservationStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryReservationStore {
    /// Create an empty store; seed it with
    /// [`initialize`](ReservationStore::initialize).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already seeded with `total_stock`.
    #[must_use]
    pub fn with_stock(total_stock: i64) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.stock = total_stock;
            inner.initialized = true;
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| SaleError::StoreUnavailable {
            reason: "reservation store mutex poisoned".to_string(),
        })
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn try_reserve(&self, user: &UserId) -> Result<ReserveOutcome> {
        let mut inner = self.lock()?;

        if !inner.purchased.insert(user.as_str().to_string()) {
            return Ok(ReserveOutcome::AlreadyReserved);
        }

        inner.stock -= 1;
        if inner.stock < 0 {
            // Roll back both writes before anyone can observe them.
            inner.stock += 1;
            inner.purchased.remove(user.as_str());
            return Ok(ReserveOutcome::SoldOut);
        }

        Ok(ReserveOutcome::Success)
    }

    async fn release(&self, user: &UserId) -> Result<()> {
        let mut inner = self.lock()?;
        inner.stock += 1;
        inner.purchased.remove(user.as_str());
        tracing::warn!(user_id = %user, "Released reserved stock");
        Ok(())
    }

    async fn remaining(&self) -> Result<i64> {
        Ok(self.lock()?.stock)
    }

    async fn has_reserved(&self, user: &UserId) -> Result<bool> {
        Ok(self.lock()?.purchased.contains(user.as_str()))
    }

    async fn initialize(&self, total_stock: i64) -> Result<bool> {
        let mut inner = self.lock()?;
        if inner.initialized {
            return Ok(false);
        }
        inner.stock = total_stock;
        inner.initialized = true;
        Ok(true)
    }

    async fn reset(&self, total_stock: i64) -> Result<()> {
        let mut inner = self.lock()?;
        inner.stock = total_stock;
        inner.purchased.clear();
        inner.initialized = true;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}

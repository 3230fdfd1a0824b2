//! PostgreSQL-backed durable storage for the flash sale service.
//!
//! The relational store owns the durable record of confirmed orders. It is
//! authoritative only for *persisted* confirmation — the reservation store
//! decides who won; rows here lag that decision by the asynchronous
//! durability path. The UNIQUE constraint on the buyer id is the sole
//! concurrency-control mechanism: conflicting writes deduplicate
//! themselves.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dead_letters;
pub mod orders;

pub use dead_letters::PostgresDeadLetterQueue;
pub use orders::PostgresOrderRepository;

use flashsale_core::error::{Result, SaleError};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Open a connection pool against the configured database.
///
/// # Errors
///
/// Returns [`SaleError::Database`] when the pool cannot be created.
pub async fn connect_pool(
    url: &str,
    max_connections: u32,
    connect_timeout: Duration,
) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(connect_timeout)
        .connect(url)
        .await
        .map_err(|err| SaleError::Database(format!("failed to connect to PostgreSQL: {err}")))
}

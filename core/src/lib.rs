//! Core domain for the flash sale service.
//!
//! A fixed quantity of a single item is sold during a bounded time window to
//! an unbounded number of concurrent buyers. The guarantees this crate is
//! responsible for:
//!
//! - no more units are sold than exist,
//! - each buyer id wins at most once,
//! - every accepted purchase carries a queued obligation to persist, and
//! - the system sheds load before the reservation primitive, never after.
//!
//! # Architecture
//!
//! ```text
//! purchase request
//!       │
//!       ▼
//! ┌──────────────────┐   sale-window gate, per-user attempt ceiling,
//! │ AdmissionGuards  │   per-source rate ceiling (fail-open)
//! └──────────────────┘
//!       │
//!       ▼
//! ┌──────────────────┐   try_reserve: dedup check + stock decrement as
//! │ ReservationStore │   ONE indivisible unit (authoritative)
//! └──────────────────┘
//!       │ Success
//!       ▼
//! ┌──────────────────┐   enqueue DurabilityJob; on enqueue failure the
//! │ PurchaseService  │   reservation is released (compensation)
//! └──────────────────┘
//!       │ queued
//!       ▼
//!   persistence worker (flashsale-runtime), idempotent via the
//!   user-id uniqueness constraint (flashsale-postgres)
//! ```
//!
//! All reservation state lives behind the [`providers::ReservationStore`]
//! seam; correctness never depends on in-process locking. The in-memory
//! implementations in [`memory`] and the Redis implementations in
//! `flashsale-redis` honor the identical atomicity contract.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admission;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod providers;
pub mod purchase;
pub mod types;

pub use admission::{AdmissionGuards, AdmissionPolicy, RateWindow};
pub use error::{Result, SaleError};
pub use lifecycle::SaleSchedule;
pub use purchase::PurchaseService;
pub use types::{
    DurabilityJob, Order, OrderId, OrderStatus, PurchaseConfirmation, PurchaseStatus,
    ReserveOutcome, SaleStatus, UserId,
};

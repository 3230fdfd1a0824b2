//! Provider traits: the seams between the purchase path and its
//! infrastructure.
//!
//! Every trait here is dyn-compatible (via `async_trait`) so the service is
//! wired with plain `Arc<dyn …>` constructor injection — no reflection, no
//! framework container. Production implementations live in
//! `flashsale-redis` and `flashsale-postgres`; the mutex-guarded
//! single-process implementations live in [`crate::memory`].

mod dead_letters;
mod orders;
mod queue;
mod rate_limiter;
mod reservation;

pub use dead_letters::{DeadLetterQueue, ParkedJob};
pub use orders::{InsertOutcome, OrderRepository};
pub use queue::JobQueue;
pub use rate_limiter::{RateDecision, RateLimiter};
pub use reservation::ReservationStore;

//! Mutex-guarded in-memory provider implementations.
//!
//! These serve two roles with one codebase:
//!
//! - the single-process deployment backend — every operation is one
//!   critical section behind a single mutex, so the atomicity contract is
//!   the same as the Redis stores' server-side execution;
//! - the test doubles the rest of the workspace exercises the purchase
//!   path against without any external infrastructure.
//!
//! For multi-instance deployments use `flashsale-redis` and
//! `flashsale-postgres` instead.

mod dead_letters;
mod orders;
mod queue;
mod rate_limiter;
mod reservation;

pub use dead_letters::MemoryDeadLetterQueue;
pub use orders::MemoryOrderRepository;
pub use queue::MemoryJobQueue;
pub use rate_limiter::MemoryRateLimiter;
pub use reservation::MemoryReservationStore;

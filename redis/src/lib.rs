//! Redis-backed implementations of the shared-store contracts.
//!
//! Redis is the single point of serialization shared by every service
//! instance: the reservation store executes its compound
//! check-and-mutate as one server-side Lua script, and the rate limiter
//! counts requests with atomic pipelines. Nothing in-process guards these
//! structures — atomicity lives entirely in the store's execution model.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod rate_limiter;
pub mod reservation;

pub use rate_limiter::RedisRateLimiter;
pub use reservation::RedisReservationStore;

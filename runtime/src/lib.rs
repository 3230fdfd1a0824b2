//! Asynchronous durability path for the flash sale service.
//!
//! The purchase orchestrator hands won reservations to a bounded in-process
//! queue ([`queue::ChannelJobQueue`]); the [`worker::PersistenceWorker`]
//! drains it on an independent scheduling lane, retrying transient database
//! failures with exponential backoff ([`retry`]) and parking jobs whose
//! retry budget is exhausted. The worker may run arbitrarily far behind the
//! admission decision — a purchase is "won" the instant its reservation
//! succeeds.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod queue;
pub mod retry;
pub mod worker;

pub use queue::{ChannelJobQueue, JobReceiver};
pub use retry::{retry_with_predicate, RetryPolicy};
pub use worker::PersistenceWorker;

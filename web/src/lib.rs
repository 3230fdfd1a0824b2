//! Axum HTTP surface for the flash sale service.
//!
//! Thin adapters over the core purchase path:
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Validate** the body (user id shape) before anything touches the core
//! 3. **Admit** through the layered guards (sale window, attempt ceiling,
//!    source rate ceiling)
//! 4. **Dispatch** to the purchase orchestrator
//! 5. **Map** the outcome to the wire shape — or to the uniform error
//!    envelope `{statusCode, message, error, timestamp, path}`
//!
//! # Endpoints
//!
//! | Method & Path          | Purpose                                   |
//! |------------------------|-------------------------------------------|
//! | GET /sale/status       | Sale lifecycle + remaining stock          |
//! | POST /purchases        | Attempt a purchase (201 on success)       |
//! | GET /purchases/:userId | Per-user purchase status                  |
//! | GET /health            | Redis/PostgreSQL connectivity             |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::{ApiError, ErrorBody};
pub use extractors::{ApiJson, ClientIp};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, ApiError>;

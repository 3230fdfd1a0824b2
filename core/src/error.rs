//! Error taxonomy for the flash sale service.

use thiserror::Error;

/// Result type alias for flash sale operations.
pub type Result<T> = std::result::Result<T, SaleError>;

/// Failure modes across the purchase path.
///
/// The variants map one-to-one onto the HTTP surface: validation and
/// sale-window rejections are 400s, guard rejections are 429s,
/// `AlreadyPurchased` is a 409, `SoldOut` a 410, infrastructure outages
/// 503s, and anything in `Database` a generic 500. Messages on the
/// user-facing variants are written to be returned verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaleError {
    // ═══════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════
    /// Malformed buyer identifier, rejected before the core is reached.
    #[error("{0}")]
    InvalidUserId(String),

    // ═══════════════════════════════════════════════════════════
    // Sale window
    // ═══════════════════════════════════════════════════════════
    /// Purchase attempted before the sale window opened.
    #[error("The sale has not started yet. Please wait.")]
    SaleNotStarted,

    /// Purchase attempted after the sale window closed.
    #[error("The sale has ended.")]
    SaleEnded,

    // ═══════════════════════════════════════════════════════════
    // Admission guards
    // ═══════════════════════════════════════════════════════════
    /// Per-user attempt ceiling exceeded for the rest of the sale window.
    #[error("Too many purchase attempts. Maximum {max_attempts} attempts allowed.")]
    TooManyAttempts {
        /// The ceiling that was exceeded.
        max_attempts: u32,
    },

    /// Per-source request-rate ceiling exceeded.
    #[error("Too many requests. Please slow down.")]
    RateLimited,

    // ═══════════════════════════════════════════════════════════
    // Reservation outcomes (permanent per user / per sale)
    // ═══════════════════════════════════════════════════════════
    /// The buyer already holds a successful reservation.
    #[error("You have already purchased this item.")]
    AlreadyPurchased,

    /// Stock is exhausted.
    #[error("Sorry, the item is sold out.")]
    SoldOut,

    // ═══════════════════════════════════════════════════════════
    // Infrastructure (transient)
    // ═══════════════════════════════════════════════════════════
    /// The shared reservation store could not be reached or timed out.
    /// Callers must not assume the operation happened.
    #[error("reservation store unavailable: {reason}")]
    StoreUnavailable {
        /// Underlying failure, for logs only.
        reason: String,
    },

    /// The durability queue refused a job; the reservation it belonged to
    /// has been (or is being) released.
    #[error("durability queue unavailable: {reason}")]
    QueueUnavailable {
        /// Underlying failure, for logs only.
        reason: String,
    },

    /// Relational store failure. Retried with backoff inside the
    /// persistence worker; a generic 500 on the query path.
    #[error("database error: {0}")]
    Database(String),
}

impl SaleError {
    /// Whether the error is a transient infrastructure failure that a
    /// retry (client-side for the reservation path, worker-side for
    /// persistence) may resolve.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::QueueUnavailable { .. } | Self::Database(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages_are_stable() {
        assert_eq!(
            SaleError::AlreadyPurchased.to_string(),
            "You have already purchased this item."
        );
        assert_eq!(SaleError::SoldOut.to_string(), "Sorry, the item is sold out.");
        assert_eq!(
            SaleError::TooManyAttempts { max_attempts: 3 }.to_string(),
            "Too many purchase attempts. Maximum 3 attempts allowed."
        );
    }

    #[test]
    fn transient_classification() {
        assert!(SaleError::StoreUnavailable { reason: "timeout".into() }.is_transient());
        assert!(SaleError::Database("connection reset".into()).is_transient());
        assert!(!SaleError::AlreadyPurchased.is_transient());
        assert!(!SaleError::SoldOut.is_transient());
    }
}

//! Domain types shared across the flash sale service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::SaleError;

/// Maximum accepted length of a buyer identifier, in characters.
pub const MAX_USER_ID_LEN: usize = 255;

/// Opaque buyer identity.
///
/// The wire format is a plain string of 1–255 characters. Validation happens
/// at construction so a malformed id never reaches the reservation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw user id.
    ///
    /// # Errors
    ///
    /// Returns [`SaleError::InvalidUserId`] when the id is empty or longer
    /// than [`MAX_USER_ID_LEN`] characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, SaleError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SaleError::InvalidUserId("userId is required".to_string()));
        }
        if raw.chars().count() > MAX_USER_ID_LEN {
            return Err(SaleError::InvalidUserId(format!(
                "userId must be at most {MAX_USER_ID_LEN} characters"
            )));
        }
        Ok(Self(raw))
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique order token, generated at reservation time by the orchestrator —
/// never by a store — so it is known before durable persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a fresh order id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an id read back from storage.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// The reservation was won and the order durably recorded.
    Confirmed,
    /// Kept for orders recorded as failed by an operator.
    Failed,
}

impl OrderStatus {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }

    /// Parse the database string representation.
    ///
    /// # Errors
    ///
    /// Returns [`SaleError::Database`] for an unknown status string.
    pub fn parse(s: &str) -> Result<Self, SaleError> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            _ => Err(SaleError::Database(format!("invalid order status: {s}"))),
        }
    }
}

/// Durable record of a confirmed purchase.
///
/// Written once by the persistence worker and never updated; the uniqueness
/// of `user_id` is the idempotency guard against duplicate job delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Order token generated at reservation time.
    pub id: OrderId,
    /// Buyer who won the reservation. At most one order per buyer.
    pub user_id: UserId,
    /// Order status.
    pub status: OrderStatus,
    /// Set at persistence time, immutable afterwards.
    pub created_at: DateTime<Utc>,
}

/// Queued unit of work that persists a won reservation as a durable order.
///
/// Produced by the orchestrator only after a successful reservation — never
/// for a failed or duplicate attempt — and consumed at-least-once by the
/// persistence worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurabilityJob {
    /// Order id generated at reservation time.
    pub order_id: OrderId,
    /// Buyer who won the reservation.
    pub user_id: UserId,
}

/// Outcome of one atomic reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// One unit claimed and the user recorded in the purchased set.
    Success,
    /// The user already holds a reservation; stock untouched.
    AlreadyReserved,
    /// Stock exhausted; the attempt left no trace.
    SoldOut,
}

/// Returned to the buyer on a confirmed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseConfirmation {
    /// Order id the buyer can poll the status endpoint with.
    pub order_id: OrderId,
    /// Confirmation message.
    pub message: String,
}

/// Per-user purchase status.
///
/// `purchased` is authoritative the instant the reservation succeeds;
/// `order_id` and `purchased_at` stay absent until the durability job lands,
/// which is a normal transient state rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseStatus {
    /// Whether this user holds a successful reservation.
    pub purchased: bool,
    /// The user the status refers to.
    pub user_id: UserId,
    /// Persisted order id, once the durability job has been processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    /// Persistence timestamp, once the durability job has been processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<DateTime<Utc>>,
}

impl PurchaseStatus {
    /// Status for a user without a reservation.
    #[must_use]
    pub const fn not_purchased(user_id: UserId) -> Self {
        Self {
            purchased: false,
            user_id,
            order_id: None,
            purchased_at: None,
        }
    }
}

/// Sale lifecycle state, a pure function of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Before the configured start instant.
    Upcoming,
    /// Between start and end.
    Active,
    /// After the configured end instant. Never reverts.
    Ended,
}

impl SaleStatus {
    /// Wire string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_1_to_255_chars() {
        assert!(UserId::new("a").is_ok());
        assert!(UserId::new("b".repeat(255)).is_ok());
    }

    #[test]
    fn user_id_rejects_empty() {
        let err = UserId::new("").unwrap_err();
        assert!(matches!(err, SaleError::InvalidUserId(_)));
    }

    #[test]
    fn user_id_rejects_overlong() {
        let err = UserId::new("c".repeat(256)).unwrap_err();
        assert!(matches!(err, SaleError::InvalidUserId(_)));
    }

    #[test]
    fn order_status_roundtrips_through_db_strings() {
        assert_eq!(OrderStatus::parse("confirmed").unwrap(), OrderStatus::Confirmed);
        assert_eq!(OrderStatus::parse("failed").unwrap(), OrderStatus::Failed);
        assert!(OrderStatus::parse("shipped").is_err());
    }

    #[test]
    fn sale_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SaleStatus::Upcoming).unwrap(), r#""upcoming""#);
        assert_eq!(serde_json::to_string(&SaleStatus::Active).unwrap(), r#""active""#);
        assert_eq!(serde_json::to_string(&SaleStatus::Ended).unwrap(), r#""ended""#);
    }

    #[test]
    fn purchase_status_omits_unpersisted_fields() {
        let user = UserId::new("buyer-1").unwrap();
        let status = PurchaseStatus {
            purchased: true,
            user_id: user,
            order_id: None,
            purchased_at: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["purchased"], true);
        assert_eq!(json["userId"], "buyer-1");
        assert!(json.get("orderId").is_none());
        assert!(json.get("purchasedAt").is_none());
    }
}

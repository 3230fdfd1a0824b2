//! Sale status endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use flashsale_core::types::SaleStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for `GET /sale/status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatusResponse {
    /// Lifecycle state at the time of the call.
    pub status: SaleStatus,
    /// Configured start instant.
    pub starts_at: DateTime<Utc>,
    /// Configured end instant.
    pub ends_at: DateTime<Utc>,
    /// Remaining stock as read from the reservation store.
    pub stock_remaining: i64,
    /// Total stock the sale opened with.
    pub total_stock: i64,
}

/// `GET /sale/status` — sale lifecycle plus remaining stock, the read-only
/// composition the polling UI consumes.
#[allow(clippy::cast_precision_loss)] // Stock counts are far below 2^52.
pub async fn sale_status(
    State(state): State<AppState>,
) -> Result<Json<SaleStatusResponse>, ApiError> {
    let stock_remaining = state.reservations.remaining().await?;
    metrics::gauge!("flash_sale_stock_remaining").set(stock_remaining as f64);

    Ok(Json(SaleStatusResponse {
        status: state.schedule.status(),
        starts_at: state.schedule.starts_at(),
        ends_at: state.schedule.ends_at(),
        stock_remaining,
        total_stock: state.schedule.total_stock(),
    }))
}

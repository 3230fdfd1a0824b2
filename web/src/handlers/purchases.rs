//! Purchase endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use flashsale_core::types::{OrderId, PurchaseStatus, UserId};
use flashsale_core::SaleError;

use crate::error::ApiError;
use crate::extractors::{ApiJson, ClientIp};
use crate::state::AppState;

/// Request body for `POST /purchases`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Buyer identity, 1–255 characters.
    pub user_id: String,
}

/// Response body for a confirmed purchase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    /// Always `true` on the 201 path.
    pub success: bool,
    /// Confirmation message.
    pub message: String,
    /// Order id the durability job will persist.
    pub order_id: OrderId,
}

/// `POST /purchases` — run the admission guards, then the orchestrator.
/// Responds 201 with the order id on success.
pub async fn create_purchase(
    State(state): State<AppState>,
    client_ip: ClientIp,
    ApiJson(body): ApiJson<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let user = UserId::new(body.user_id)?;

    if let Err(err) = state.guards.admit(&user, client_ip.0).await {
        metrics::counter!("flash_sale_purchases_total", "outcome" => "rejected").increment(1);
        return Err(err.into());
    }

    match state.purchases.attempt_purchase(&user).await {
        Ok(confirmation) => {
            metrics::counter!("flash_sale_purchases_total", "outcome" => "confirmed").increment(1);
            Ok((
                StatusCode::CREATED,
                Json(PurchaseResponse {
                    success: true,
                    message: confirmation.message,
                    order_id: confirmation.order_id,
                }),
            ))
        }
        Err(err) => {
            let outcome = match &err {
                SaleError::AlreadyPurchased => "duplicate",
                SaleError::SoldOut => "sold_out",
                _ => "failed",
            };
            metrics::counter!("flash_sale_purchases_total", "outcome" => outcome).increment(1);
            Err(err.into())
        }
    }
}

/// `GET /purchases/:userId` — per-user purchase status. `purchased` is
/// authoritative from the reservation store; the order fields appear once
/// the durability job has landed.
pub async fn purchase_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PurchaseStatus>, ApiError> {
    let user = UserId::new(user_id)?;
    Ok(Json(state.purchases.purchase_status(&user).await?))
}

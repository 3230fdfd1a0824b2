//! Health check endpoint.
//!
//! Probes both backing stores concurrently and reports per-service status
//! with latency, for load balancers and monitoring.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use flashsale_core::error::Result as SaleResult;

use crate::state::AppState;

/// Overall service health document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` when both services are up, `down` when both are down,
    /// `degraded` otherwise.
    pub status: &'static str,
    /// When the probes ran.
    pub timestamp: DateTime<Utc>,
    /// Per-service results.
    pub services: ServiceReport,
}

/// Per-service probe results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReport {
    /// Reservation store (Redis).
    pub redis: ServiceHealth,
    /// Order store (PostgreSQL).
    pub database: ServiceHealth,
}

/// One dependency's probe result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    /// `up` or `down`.
    pub status: &'static str,
    /// Probe round-trip in milliseconds.
    pub latency_ms: u128,
    /// Failure detail when down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /health` — ping Redis and PostgreSQL concurrently.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (redis, database) = tokio::join!(
        probe("redis", state.reservations.ping()),
        probe("database", state.orders.ping()),
    );

    let status = match (redis.status, database.status) {
        ("up", "up") => "ok",
        ("down", "down") => "down",
        _ => "degraded",
    };

    Json(HealthResponse {
        status,
        timestamp: Utc::now(),
        services: ServiceReport { redis, database },
    })
}

async fn probe(
    name: &'static str,
    ping: impl std::future::Future<Output = SaleResult<()>>,
) -> ServiceHealth {
    let started = Instant::now();
    match ping.await {
        Ok(()) => ServiceHealth {
            status: "up",
            latency_ms: started.elapsed().as_millis(),
            error: None,
        },
        Err(err) => {
            tracing::warn!(service = name, error = %err, "Health check failed");
            ServiceHealth {
                status: "down",
                latency_ms: started.elapsed().as_millis(),
                error: Some(err.to_string()),
            }
        }
    }
}

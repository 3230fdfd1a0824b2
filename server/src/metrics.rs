//! Prometheus metrics bootstrap.
//!
//! Installs the global recorder and registers the business metric
//! descriptions. The returned handle renders the scrape text for
//! `GET /metrics`.

use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and register metric descriptions.
///
/// Returns `None` when a recorder is already installed (tests); the
/// existing recorder keeps collecting and no scrape endpoint is exposed.
pub fn install() -> Option<PrometheusHandle> {
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!(error = %err, "Metrics recorder already installed, skipping");
            None
        }
    };

    describe_counter!(
        "flash_sale_purchases_total",
        "Purchase attempts by outcome (confirmed, duplicate, sold_out, rejected, failed)"
    );
    describe_counter!(
        "flash_sale_orders_persisted_total",
        "Orders durably written by the persistence worker"
    );
    describe_counter!(
        "flash_sale_jobs_parked_total",
        "Durability jobs parked after exhausting their retries"
    );
    describe_gauge!(
        "flash_sale_stock_remaining",
        "Remaining stock as last observed by the status endpoint"
    );

    tracing::info!("Business metrics registered");
    handle
}

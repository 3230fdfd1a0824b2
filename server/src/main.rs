//! Flash sale HTTP server.
//!
//! Wires the Redis reservation store, the PostgreSQL order repository, the
//! bounded durability queue with its persistence worker, and the Axum
//! router, then serves until SIGINT/SIGTERM and drains the queue on the
//! way out.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use flashsale_core::admission::AdmissionGuards;
use flashsale_core::providers::ReservationStore;
use flashsale_core::purchase::PurchaseService;
use flashsale_postgres::{connect_pool, PostgresDeadLetterQueue, PostgresOrderRepository};
use flashsale_redis::{RedisRateLimiter, RedisReservationStore};
use flashsale_runtime::queue::ChannelJobQueue;
use flashsale_runtime::worker::PersistenceWorker;
use flashsale_web::{build_router, AppState};

mod config;
mod metrics;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,flashsale=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting flash sale server");

    let config = Config::from_env();
    info!(
        starts_at = %config.sale.starts_at,
        ends_at = %config.sale.ends_at,
        stock = config.sale.stock_quantity,
        redis_url = %config.redis.url,
        "Configuration loaded"
    );

    let prometheus = metrics::install();

    // Shared reservation state (stock counter + dedup set).
    info!("Connecting to Redis...");
    let reservations = Arc::new(RedisReservationStore::connect(&config.redis.url).await?);
    reservations.initialize(config.sale.stock_quantity).await?;
    let limiter = Arc::new(RedisRateLimiter::connect(&config.redis.url).await?);
    info!("Reservation store ready");

    // Durable order storage.
    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(config.database.connect_timeout),
    )
    .await?;
    let orders = Arc::new(PostgresOrderRepository::new(pool.clone()));
    orders.ensure_schema().await?;
    let dead_letters = Arc::new(PostgresDeadLetterQueue::new(pool));
    dead_letters.ensure_schema().await?;
    info!("Order store ready");

    // Asynchronous durability path.
    let (queue, jobs) = ChannelJobQueue::bounded(config.queue.capacity);
    let worker = PersistenceWorker::new(orders.clone(), dead_letters, config.retry_policy());
    let worker_handle = tokio::spawn(worker.run(jobs));

    // Explicit constructor wiring; no framework container.
    let schedule = config.schedule();
    let guards = Arc::new(AdmissionGuards::new(
        schedule.clone(),
        limiter,
        config.admission_policy(),
    ));
    let purchases = Arc::new(PurchaseService::new(
        reservations.clone(),
        orders.clone(),
        Arc::new(queue),
    ));
    let state = AppState::new(schedule, guards, purchases, reservations, orders);

    let mut app = build_router(state);
    if let Some(handle) = prometheus {
        app = app.route(
            "/metrics",
            axum::routing::get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the queue sender) is gone; the worker drains
    // whatever is still queued and stops when the channel closes.
    info!("Draining durability queue");
    let drain = Duration::from_secs(config.server.shutdown_timeout);
    if tokio::time::timeout(drain, worker_handle).await.is_err() {
        warn!("Persistence worker did not drain in time");
    }

    info!("Server stopped");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

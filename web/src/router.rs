//! Router configuration.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Router};
use tower_http::cors::CorsLayer;

use crate::handlers::{health, purchases, sale};
use crate::middleware::{error_envelope, request_logging};
use crate::state::AppState;

/// Build the complete Axum router.
///
/// Routes are mounted at the paths the UI consumes, with CORS for the local
/// frontend dev servers, request logging, and the uniform error envelope
/// applied to every response.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://localhost:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/sale/status", get(sale::sale_status))
        .route("/purchases", post(purchases::create_purchase))
        .route("/purchases/:user_id", get(purchases::purchase_status))
        .route("/health", get(health::health))
        .layer(axum_middleware::from_fn(request_logging))
        .layer(axum_middleware::from_fn(error_envelope))
        .layer(cors)
        .with_state(state)
}

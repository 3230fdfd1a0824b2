//! Application state shared across HTTP handlers.

use std::sync::Arc;

use flashsale_core::admission::AdmissionGuards;
use flashsale_core::lifecycle::SaleSchedule;
use flashsale_core::providers::{OrderRepository, ReservationStore};
use flashsale_core::purchase::PurchaseService;

/// Shared state, cloned (cheaply via `Arc`) per request.
///
/// Everything here is wired once at startup with plain constructor
/// injection; no behavior depends on a framework container.
#[derive(Clone)]
pub struct AppState {
    /// Immutable sale window configuration.
    pub schedule: SaleSchedule,
    /// Layered admission guards run before the orchestrator.
    pub guards: Arc<AdmissionGuards>,
    /// Purchase orchestrator.
    pub purchases: Arc<PurchaseService>,
    /// Reservation store, read directly by the status and health paths.
    pub reservations: Arc<dyn ReservationStore>,
    /// Order repository, pinged by the health path.
    pub orders: Arc<dyn OrderRepository>,
}

impl AppState {
    /// Assemble the state from its wired dependencies.
    #[must_use]
    pub fn new(
        schedule: SaleSchedule,
        guards: Arc<AdmissionGuards>,
        purchases: Arc<PurchaseService>,
        reservations: Arc<dyn ReservationStore>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            schedule,
            guards,
            purchases,
            reservations,
            orders,
        }
    }
}

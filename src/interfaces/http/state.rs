//! Shared handler state

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;

use crate::application::{
    CheckoutService, PaymentConfirmationHandler, ReservationLedger, StaleReservationReaper,
};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::JwtConfig;
use crate::interfaces::http::middleware::AuthState;

/// Everything the HTTP handlers reach for. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub repos: Arc<dyn RepositoryProvider>,
    pub ledger: Arc<ReservationLedger>,
    pub checkout: Arc<CheckoutService>,
    pub payments: Arc<PaymentConfirmationHandler>,
    pub reaper: Arc<StaleReservationReaper>,
    pub jwt_config: JwtConfig,
    /// bcrypt cost for newly registered passwords
    pub password_cost: u32,
    pub metrics: Option<PrometheusHandle>,
    pub started_at: Instant,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        AuthState {
            jwt_config: state.jwt_config.clone(),
        }
    }
}

//! Prometheus scrape endpoint
//!
//! Renders the recorder installed at start-up. Without one (tests, or a
//! second server in the same process) the endpoint answers 404.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::interfaces::http::state::AppState;

/// `GET /metrics`, no auth
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [("content-type", "text/plain; charset=utf-8")],
            "metrics recorder not installed".to_string(),
        ),
    }
}

//! Admin maintenance endpoints

use axum::{extract::State, Extension};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::interfaces::http::common::{ok, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReapResponse {
    /// Pending reservations cancelled by this run
    pub cancelled: u64,
    pub ran_at: DateTime<Utc>,
    pub reaper_running: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/reap",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stale pending reservations released", body = ApiResponse<ReapResponse>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn run_reaper(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<ReapResponse> {
    user.require_admin()?;
    let ran_at = Utc::now();
    let cancelled = state.reaper.run_once_at(ran_at).await?;
    info!(cancelled, by = %user.user_id, "Manual reaper run");
    ok(ReapResponse {
        cancelled,
        ran_at,
        reaper_running: state.reaper.is_running(),
    })
}

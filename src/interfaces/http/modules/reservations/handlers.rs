//! Reservation handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{BookingIntentRequest, BookingIntentResponse, ReservationDto};
use crate::interfaces::http::common::{ok, ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/reservations/intent",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    request_body = BookingIntentRequest,
    responses(
        (status = 201, description = "Pending reservation held; pay at redirect_url", body = ApiResponse<BookingIntentResponse>),
        (status = 400, description = "Invalid dates or party"),
        (status = 404, description = "Unknown hotel"),
        (status = 409, description = "No room for the requested stay"),
        (status = 502, description = "Payment provider unavailable; nothing is held")
    )
)]
pub async fn create_intent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<BookingIntentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingIntentResponse>>), ApiError> {
    let stay = request.stay()?;
    let party = request.party()?;
    let started = state
        .checkout
        .start(request.hotel_id, &user.user_id, stay, party)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(started.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/mine",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's reservations, latest checkin first", body = ApiResponse<Vec<ReservationDto>>)
    )
)]
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<ReservationDto>> {
    let reservations = state.ledger.list_for_user(&user.user_id).await?;
    ok(reservations.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every reservation for admins, own reservations otherwise", body = ApiResponse<Vec<ReservationDto>>)
    )
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<ReservationDto>> {
    let reservations = state.ledger.list_for(&user.actor()).await?;
    ok(reservations.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown reservation")
    )
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<ReservationDto> {
    let reservation = state.ledger.get(id, &user.actor()).await?;
    ok(reservation.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Cancelled; the dates are free again", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown reservation"),
        (status = 409, description = "Already cancelled")
    )
)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<ReservationDto> {
    let reservation = state.ledger.cancel(id, &user.actor()).await?;
    ok(reservation.into())
}

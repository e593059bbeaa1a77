//! Hotel catalog handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use super::dto::{
    AvailabilityResponse, CreateHotelRequest, HotelDto, SearchQuery, StayQuery, UpdateRateRequest,
};
use crate::domain::{BookingError, HotelSearch, Party};
use crate::interfaces::http::common::{ok, ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/hotels/search",
    tag = "Hotels",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "Hotels free for the requested stay", body = ApiResponse<Vec<HotelDto>>),
        (status = 400, description = "Invalid dates or party")
    )
)]
pub async fn search_hotels(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<HotelDto>> {
    let stay_query = query.stay_query();
    let stay = stay_query.stay()?;
    let filter = HotelSearch {
        destination: query
            .destination
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        stay,
        party: stay_query.party()?,
        max_nightly_rate_cents: query.max_nightly_rate_cents,
    };

    let hotels = state.repos.hotels().search(&filter).await?;
    ok(hotels
        .into_iter()
        .map(|h| HotelDto::new(h, stay.as_ref()))
        .collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/hotels/{id}",
    tag = "Hotels",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Hotel id")),
    responses(
        (status = 200, description = "Hotel", body = ApiResponse<HotelDto>),
        (status = 404, description = "Unknown hotel")
    )
)]
pub async fn get_hotel(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<HotelDto> {
    let hotel = state
        .repos
        .hotels()
        .find_by_id(id)
        .await?
        .ok_or_else(|| BookingError::not_found("Hotel", id))?;
    ok(HotelDto::new(hotel, None))
}

#[utoipa::path(
    get,
    path = "/api/v1/hotels/{id}/availability",
    tag = "Hotels",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Hotel id"), StayQuery),
    responses(
        (status = 200, description = "Availability and quote", body = ApiResponse<AvailabilityResponse>),
        (status = 400, description = "Dates missing or invalid"),
        (status = 404, description = "Unknown hotel")
    )
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<StayQuery>,
) -> ApiResult<AvailabilityResponse> {
    let stay = query
        .stay()?
        .ok_or_else(|| BookingError::Validation("checkin and checkout are required".into()))?;
    let party = query.party()?.unwrap_or(Party {
        adults: 1,
        children: 0,
        pets: false,
    });

    let hotel = state
        .repos
        .hotels()
        .find_by_id(id)
        .await?
        .ok_or_else(|| BookingError::not_found("Hotel", id))?;
    let availability = state
        .ledger
        .availability()
        .check_hotel(&hotel, &stay, &party)
        .await?;

    ok(AvailabilityResponse::new(&hotel, &stay, &availability)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/hotels",
    tag = "Hotels",
    security(("bearer_auth" = [])),
    request_body = CreateHotelRequest,
    responses(
        (status = 201, description = "Hotel created", body = ApiResponse<HotelDto>),
        (status = 403, description = "Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_hotel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateHotelRequest>,
) -> Result<(StatusCode, Json<ApiResponse<HotelDto>>), ApiError> {
    user.require_admin()?;
    let hotel = state.repos.hotels().create(request.into()).await?;
    info!(hotel_id = hotel.id, name = %hotel.name, by = %user.user_id, "Hotel created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(HotelDto::new(hotel, None))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/hotels/{id}/rate",
    tag = "Hotels",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Hotel id")),
    request_body = UpdateRateRequest,
    responses(
        (status = 200, description = "Rate changed; existing reservations keep their price", body = ApiResponse<HotelDto>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown hotel")
    )
)]
pub async fn update_rate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateRateRequest>,
) -> ApiResult<HotelDto> {
    user.require_admin()?;
    let hotel = state
        .repos
        .hotels()
        .update_nightly_rate(id, request.nightly_rate_cents)
        .await?;
    info!(
        hotel_id = id,
        nightly_rate_cents = request.nightly_rate_cents,
        by = %user.user_id,
        "Nightly rate updated"
    );
    ok(HotelDto::new(hotel, None))
}

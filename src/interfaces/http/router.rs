//! API router with Swagger UI

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::middleware::{auth_middleware, AuthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics};
use super::modules::request_id::request_id_middleware;
use super::modules::{admin, auth, health, hotels, payments, reservations};
use super::state::AppState;

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::get_current_user,
        hotels::search_hotels,
        hotels::get_hotel,
        hotels::check_availability,
        hotels::create_hotel,
        hotels::update_rate,
        reservations::create_intent,
        reservations::list_mine,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::cancel_reservation,
        payments::payment_webhook,
        admin::run_reaper,
    ),
    components(
        schemas(
            ApiResponse<String>,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::UserInfo,
            hotels::HotelDto,
            hotels::AvailabilityResponse,
            hotels::CreateHotelRequest,
            hotels::UpdateRateRequest,
            reservations::BookingIntentRequest,
            reservations::BookingIntentResponse,
            reservations::ReservationDto,
            payments::WebhookAck,
            admin::ReapResponse,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Authentication", description = "Registration, login (JWT), profile"),
        (name = "Hotels", description = "Catalog search, availability and quotes"),
        (name = "Reservations", description = "Booking intents and the reservation ledger"),
        (name = "Payments", description = "Signed checkout notifications from the payment provider"),
        (name = "Admin", description = "Operational tasks"),
    ),
    info(
        title = "JustDreams Booking API",
        version = "1.0.0",
        description = "Hotel availability, reservations and payment confirmation",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the full application router.
pub fn create_api_router(state: AppState) -> Router {
    let auth_layer = middleware::from_fn_with_state(
        AuthState {
            jwt_config: state.jwt_config.clone(),
        },
        auth_middleware,
    );

    let public_auth = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let protected_auth = Router::new()
        .route("/me", get(auth::get_current_user))
        .route_layer(auth_layer.clone());

    let hotel_routes = Router::new()
        .route("/", post(hotels::create_hotel))
        .route("/search", get(hotels::search_hotels))
        .route("/{id}", get(hotels::get_hotel))
        .route("/{id}/availability", get(hotels::check_availability))
        .route("/{id}/rate", put(hotels::update_rate))
        .route_layer(auth_layer.clone());

    let reservation_routes = Router::new()
        .route("/", get(reservations::list_reservations))
        .route("/intent", post(reservations::create_intent))
        .route("/mine", get(reservations::list_mine))
        .route(
            "/{id}",
            get(reservations::get_reservation).delete(reservations::cancel_reservation),
        )
        .route_layer(auth_layer.clone());

    let admin_routes = Router::new()
        .route("/reap", get(admin::run_reaper))
        .route_layer(auth_layer);

    // Signature-authenticated, no JWT
    let payment_routes = Router::new().route("/webhook", post(payments::payment_webhook));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(prometheus_metrics))
        .nest("/api/v1/auth", public_auth.merge(protected_auth))
        .nest("/api/v1/hotels", hotel_routes)
        .nest("/api/v1/reservations", reservation_routes)
        .nest("/api/v1/payments", payment_routes)
        .nest("/api/v1/admin", admin_routes)
        .with_state(state)
        .merge(swagger_routes)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

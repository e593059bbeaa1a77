//! HTTP flows through the full axum router.

mod common;

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use justdreams_booking::application::{ReaperConfig, StaleReservationReaper};
use justdreams_booking::domain::{Actor, UserRole};
use justdreams_booking::infrastructure::crypto::{hash_password_with_cost, JwtConfig};
use justdreams_booking::infrastructure::payment::SIGNATURE_HEADER;
use justdreams_booking::interfaces::http::{create_api_router, AppState};

use common::*;

const PASSWORD: &str = "correct-horse";

struct Api {
    router: Router,
    h: Harness,
}

impl Api {
    async fn new() -> Self {
        let h = Harness::new().await;
        let state = AppState {
            db: h.db.clone(),
            repos: h.repos.clone(),
            ledger: h.ledger.clone(),
            checkout: h.checkout.clone(),
            payments: h.payments.clone(),
            reaper: Arc::new(StaleReservationReaper::new(
                h.repos.clone(),
                ReaperConfig::default(),
            )),
            jwt_config: JwtConfig::new("test-secret", 1),
            password_cost: 4,
            metrics: None,
            started_at: Instant::now(),
        };
        Self {
            router: create_api_router(state),
            h,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn webhook(&self, payload: Vec<u8>, signature: Option<String>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/payments/webhook")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(payload)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn register_and_login(&self, username: &str) -> String {
        let (status, _) = self
            .call(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.test", username),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(username).await
    }

    async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        let hash = hash_password_with_cost(PASSWORD, 4).unwrap();
        seed_user_with(self.h.repos.as_ref(), "root", &hash, UserRole::Admin).await;
        self.login("root").await
    }

    async fn create_hotel(&self, admin: &str, rate: i64) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/hotels",
                Some(admin),
                Some(json!({
                    "name": "Le Parisien Luxe",
                    "city": "Paris",
                    "country": "France",
                    "nightly_rate_cents": rate,
                    "adults_per_room": 2,
                    "children_per_room": 1,
                    "pets_allowed": true
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }
}

fn intent(hotel_id: i64, checkin: &str, checkout: &str) -> Value {
    json!({
        "hotel_id": hotel_id,
        "checkin": checkin,
        "checkout": checkout,
        "adults": 2
    })
}

#[tokio::test]
async fn register_login_and_profile() {
    let api = Api::new().await;
    let token = api.register_and_login("alice").await;

    let (status, body) = api.call(Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "user");

    let (status, body) = api
        .call(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = api
        .call(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "other@example.test",
                "password": PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let api = Api::new().await;

    let (status, body) = api.call(Method::GET, "/api/v1/reservations/mine", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());

    let (status, _) = api
        .call(Method::GET, "/api/v1/auth/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_maintenance_is_admin_only() {
    let api = Api::new().await;
    let admin = api.admin_token().await;
    let guest = api.register_and_login("guest").await;

    let (status, _) = api
        .call(
            Method::POST,
            "/api/v1/hotels",
            Some(&guest),
            Some(json!({
                "name": "Nope",
                "city": "Rome",
                "country": "Italy",
                "nightly_rate_cents": 100,
                "adults_per_room": 2
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = api
        .call(
            Method::POST,
            "/api/v1/hotels",
            Some(&admin),
            Some(json!({
                "name": "",
                "city": "Rome",
                "country": "Italy",
                "nightly_rate_cents": -1,
                "adults_per_room": 2
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let hotel_id = api.create_hotel(&admin, 10_000).await;
    let (status, body) = api
        .call(
            Method::PUT,
            &format!("/api/v1/hotels/{}/rate", hotel_id),
            Some(&admin),
            Some(json!({ "nightly_rate_cents": 12_000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nightly_rate_cents"], 12_000);

    let (status, _) = api
        .call(Method::GET, "/api/v1/hotels/9999", Some(&guest), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_and_availability_reflect_bookings() {
    let api = Api::new().await;
    let admin = api.admin_token().await;
    let guest = api.register_and_login("guest").await;
    let hotel_id = api.create_hotel(&admin, 10_000).await;

    let search = "/api/v1/hotels/search?destination=paris&checkin=2025-06-01&checkout=2025-06-05&adults=2";
    let (status, body) = api.call(Method::GET, search, Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    let hotels = body["data"].as_array().unwrap();
    assert_eq!(hotels.len(), 1);
    assert_eq!(hotels[0]["total_price_cents"], 40_000);

    let (status, _) = api
        .call(
            Method::POST,
            "/api/v1/reservations/intent",
            Some(&guest),
            Some(intent(hotel_id, "2025-06-01", "2025-06-05")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = api.call(Method::GET, search, Some(&guest), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = api
        .call(
            Method::GET,
            &format!(
                "/api/v1/hotels/{}/availability?checkin=2025-06-05&checkout=2025-06-07&adults=2",
                hotel_id
            ),
            Some(&guest),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available"], true);
    assert_eq!(body["data"]["nights"], 2);

    let (_, body) = api
        .call(
            Method::GET,
            &format!(
                "/api/v1/hotels/{}/availability?checkin=2025-06-04&checkout=2025-06-07",
                hotel_id
            ),
            Some(&guest),
            None,
        )
        .await;
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["reason"], "dates already booked");

    let (status, _) = api
        .call(
            Method::GET,
            &format!(
                "/api/v1/hotels/{}/availability?checkin=2025-06-07&checkout=2025-06-07",
                hotel_id
            ),
            Some(&guest),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_payment_and_cancellation_flow() {
    let api = Api::new().await;
    let admin = api.admin_token().await;
    let alice = api.register_and_login("alice").await;
    let bob = api.register_and_login("bob").await;
    let hotel_id = api.create_hotel(&admin, 100).await;

    let (status, body) = api
        .call(
            Method::POST,
            "/api/v1/reservations/intent",
            Some(&alice),
            Some(intent(hotel_id, "2025-06-01", "2025-06-05")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["total_price_cents"], 400);
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"]["redirect_url"].as_str().unwrap().starts_with("https://"));
    let reservation_id = body["data"]["reservation_id"].as_i64().unwrap() as i32;

    let (status, _) = api
        .call(
            Method::POST,
            "/api/v1/reservations/intent",
            Some(&bob),
            Some(intent(hotel_id, "2025-06-03", "2025-06-07")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = api
        .call(
            Method::POST,
            "/api/v1/reservations/intent",
            Some(&bob),
            Some(intent(hotel_id, "2025-06-07", "2025-06-03")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let reservation = api
        .h
        .ledger
        .get(reservation_id, &Actor::admin("root"))
        .await
        .unwrap();
    let payload = completed_event(&reservation, "evt_http");

    let (status, _) = api.webhook(payload.clone(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = api.webhook(payload.clone(), Some(sign(&payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "confirmed");

    let (status, body) = api.webhook(payload.clone(), Some(sign(&payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "duplicate");
    assert_eq!(api.h.notifier.count(), 1);

    let (status, body) = api
        .call(Method::GET, "/api/v1/reservations/mine", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["status"], "paid");

    let path = format!("/api/v1/reservations/{}", reservation_id);
    let (status, _) = api.call(Method::GET, &path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = api.call(Method::DELETE, &path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = api.call(Method::DELETE, &path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, _) = api.call(Method::DELETE, &path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = api
        .call(
            Method::POST,
            "/api/v1/reservations/intent",
            Some(&bob),
            Some(intent(hotel_id, "2025-06-03", "2025-06-07")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = api.call(Method::GET, "/api/v1/reservations", Some(&admin), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_can_trigger_the_reaper() {
    let api = Api::new().await;
    let admin = api.admin_token().await;
    let guest = api.register_and_login("guest").await;

    let (status, _) = api.call(Method::GET, "/api/v1/admin/reap", Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = api.call(Method::GET, "/api/v1/admin/reap", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cancelled"], 0);
}

#[tokio::test]
async fn health_and_request_ids() {
    let api = Api::new().await;

    let response = api
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-123");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["status"], "ok");

    let response = api
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let (status, _) = api.call(Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

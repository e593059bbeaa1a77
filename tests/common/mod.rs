//! Shared fixtures for the integration tests: a migrated in-memory
//! database, seed helpers, fake outbound adapters and signed webhooks.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::json;

use justdreams_booking::application::ports::{
    CheckoutRequest, CheckoutSession, ConfirmationNotifier, MailTransport, OutgoingMail,
    PaymentProvider,
};
use justdreams_booking::application::{
    CheckoutService, PaymentConfirmationHandler, ReservationLedger,
};
use justdreams_booking::domain::{
    BookingError, BookingResult, Hotel, NewHotel, NewUser, Party, RepositoryProvider,
    Reservation, StayDates, User, UserRole,
};
use justdreams_booking::infrastructure::database::migrator::Migrator;
use justdreams_booking::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use justdreams_booking::infrastructure::payment::{sign_payload, StripeSignatureVerifier};
use justdreams_booking::infrastructure::{init_database, DatabaseConfig};

pub const WEBHOOK_SECRET: &str = "whsec_integration";

pub async fn setup_db() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub async fn setup() -> (DatabaseConnection, Arc<dyn RepositoryProvider>) {
    let db = setup_db().await;
    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
    (db, repos)
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("YYYY-MM-DD")
}

pub fn stay(checkin: &str, checkout: &str) -> StayDates {
    StayDates::new(date(checkin), date(checkout)).expect("valid stay")
}

pub fn adults(n: u32) -> Party {
    Party::new(n, 0, false).expect("valid party")
}

pub async fn seed_user(repos: &dyn RepositoryProvider, username: &str) -> User {
    seed_user_with(repos, username, "not-a-real-hash", UserRole::User).await
}

pub async fn seed_user_with(
    repos: &dyn RepositoryProvider,
    username: &str,
    password_hash: &str,
    role: UserRole,
) -> User {
    repos
        .users()
        .create(NewUser {
            username: username.to_string(),
            email: format!("{}@example.test", username),
            password_hash: password_hash.to_string(),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
            role,
        })
        .await
        .expect("seed user")
}

pub async fn seed_hotel(repos: &dyn RepositoryProvider, name: &str, rate_cents: i64) -> Hotel {
    repos
        .hotels()
        .create(NewHotel {
            name: name.to_string(),
            city: "Paris".to_string(),
            country: "France".to_string(),
            nightly_rate_cents: rate_cents,
            adults_per_room: 4,
            children_per_room: 2,
            pets_allowed: false,
        })
        .await
        .expect("seed hotel")
}

/// Payment provider that records requests and can be told to fail.
#[derive(Default)]
pub struct FakePaymentProvider {
    pub requests: Mutex<Vec<CheckoutRequest>>,
    pub fail: AtomicBool,
}

impl FakePaymentProvider {
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.fail.store(true, Ordering::SeqCst);
        provider
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentProvider for FakePaymentProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> BookingResult<CheckoutSession> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(BookingError::Payment("provider unavailable".to_string()));
        }
        Ok(CheckoutSession {
            session_id: format!("cs_fake_{}", request.metadata.correlation_token),
            redirect_url: format!(
                "https://pay.example.test/{}",
                request.metadata.correlation_token
            ),
        })
    }
}

/// Counts confirmation notices.
#[derive(Default)]
pub struct RecordingNotifier {
    pub confirmed: AtomicUsize,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.confirmed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmationNotifier for RecordingNotifier {
    async fn reservation_confirmed(&self, _reservation: &Reservation) -> BookingResult<()> {
        self.confirmed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Always fails, counting the attempts.
#[derive(Default)]
pub struct FailingNotifier {
    pub attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmationNotifier for FailingNotifier {
    async fn reservation_confirmed(&self, _reservation: &Reservation) -> BookingResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BookingError::Notification("smtp relay refused the connection".to_string()))
    }
}

/// Keeps every mail instead of sending it.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: OutgoingMail) -> BookingResult<()> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// The services a booking flow needs, wired over one repository provider.
pub struct Harness {
    pub db: DatabaseConnection,
    pub repos: Arc<dyn RepositoryProvider>,
    pub ledger: Arc<ReservationLedger>,
    pub provider: Arc<FakePaymentProvider>,
    pub checkout: Arc<CheckoutService>,
    pub notifier: Arc<RecordingNotifier>,
    pub payments: Arc<PaymentConfirmationHandler>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_provider(FakePaymentProvider::default()).await
    }

    pub async fn with_provider(provider: FakePaymentProvider) -> Self {
        let (db, repos) = setup().await;
        let ledger = Arc::new(ReservationLedger::new(repos.clone()));
        let provider = Arc::new(provider);
        let checkout = Arc::new(CheckoutService::new(
            repos.clone(),
            ledger.clone(),
            provider.clone(),
        ));
        let notifier = Arc::new(RecordingNotifier::default());
        let payments = Arc::new(PaymentConfirmationHandler::new(
            repos.clone(),
            ledger.clone(),
            Arc::new(StripeSignatureVerifier::new(WEBHOOK_SECRET, 300)),
            notifier.clone(),
        ));
        Self {
            db,
            repos,
            ledger,
            provider,
            checkout,
            notifier,
            payments,
        }
    }
}

impl Harness {
    /// A payment handler over this harness's ledger with a different notifier.
    pub fn payments_with(&self, notifier: Arc<dyn ConfirmationNotifier>) -> PaymentConfirmationHandler {
        PaymentConfirmationHandler::new(
            self.repos.clone(),
            self.ledger.clone(),
            Arc::new(StripeSignatureVerifier::new(WEBHOOK_SECRET, 300)),
            notifier,
        )
    }
}

/// A `checkout.session.completed` event for `reservation`, as the provider
/// would send it.
pub fn completed_event(reservation: &Reservation, event_id: &str) -> Vec<u8> {
    json!({
        "id": event_id,
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": format!("cs_test_{}", reservation.id),
            "payment_status": "paid",
            "client_reference_id": reservation.correlation_token,
            "metadata": {
                "correlation_token": reservation.correlation_token,
                "reservation_id": reservation.id.to_string(),
                "hotel_id": reservation.hotel_id.to_string(),
                "user_id": reservation.user_id,
                "checkin": reservation.stay.checkin().to_string(),
                "checkout": reservation.stay.checkout().to_string(),
                "adults": reservation.party.adults.to_string(),
                "children": reservation.party.children.to_string(),
                "pets": reservation.party.pets.to_string(),
                "total_price_cents": reservation.total_price_cents.to_string(),
            }
        }}
    })
    .to_string()
    .into_bytes()
}

/// Signature header for `payload`, timestamped now.
pub fn sign(payload: &[u8]) -> String {
    sign_payload(WEBHOOK_SECRET, Utc::now().timestamp(), payload).expect("signature")
}

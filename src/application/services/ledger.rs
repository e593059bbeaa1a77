//! Reservation Ledger
//!
//! The only writer of reservation rows. Every state change goes through a
//! guarded storage operation so that concurrent callers cannot double-book a
//! hotel or finalize a reservation twice:
//!
//! ```text
//! create_pending ──► pending ──mark_paid──► paid
//!                       │                    │
//!                       └──────cancel────────┴──► cancelled
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::availability::AvailabilityChecker;
use crate::application::ports::BookingMetadata;
use crate::domain::{
    Actor, BookingError, BookingResult, NewReservation, Party, RepositoryProvider, Reservation,
    ReservationStatus, StayDates,
};
use crate::notifications::{Event, ReservationEvent, SharedEventBus};
use crate::shared::{retry, RetryPolicy};

/// Result of a payment confirmation against the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum PaidTransition {
    /// This call moved the reservation to `paid`
    Transitioned(Reservation),
    /// It was already paid under the same correlation token
    AlreadyPaid(Reservation),
}

impl PaidTransition {
    pub fn reservation(&self) -> &Reservation {
        match self {
            Self::Transitioned(r) | Self::AlreadyPaid(r) => r,
        }
    }

    pub fn transitioned(&self) -> bool {
        matches!(self, Self::Transitioned(_))
    }
}

pub struct ReservationLedger {
    repos: Arc<dyn RepositoryProvider>,
    availability: AvailabilityChecker,
    events: Option<SharedEventBus>,
    retry_policy: RetryPolicy,
}

impl ReservationLedger {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            availability: AvailabilityChecker::new(repos.clone()),
            repos,
            events: None,
            retry_policy: RetryPolicy::once(),
        }
    }

    pub fn with_events(mut self, events: SharedEventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    /// Record a booking intent. The price is quoted from the hotel's current
    /// nightly rate and frozen on the row.
    pub async fn create_pending(
        &self,
        hotel_id: i32,
        user_id: &str,
        stay: StayDates,
        party: Party,
    ) -> BookingResult<Reservation> {
        let hotel = self
            .repos
            .hotels()
            .find_by_id(hotel_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Hotel", hotel_id))?;

        let availability = self.availability.check_hotel(&hotel, &stay, &party).await?;
        if !availability.is_available() {
            info!(
                hotel_id,
                user_id,
                reason = availability.reason().unwrap_or_default(),
                "Booking intent rejected"
            );
            return Err(BookingError::Capacity);
        }

        let total_price_cents = hotel.quote(&stay)?;
        let new = NewReservation::pending(hotel.id, user_id, stay, party, total_price_cents);
        let reservation = self.insert(new, "create_pending").await?;

        info!(
            reservation_id = reservation.id,
            hotel_id,
            user_id,
            total_price_cents,
            "Pending reservation created"
        );
        metrics::counter!("reservations_created_total").increment(1);
        self.publish(Event::ReservationCreated(ReservationEvent::from(&reservation)));

        Ok(reservation)
    }

    /// `pending → paid`, idempotent for the same correlation token.
    pub async fn mark_paid(
        &self,
        reservation_id: i32,
        correlation_token: &str,
        payment_reference: Option<String>,
    ) -> BookingResult<PaidTransition> {
        let existing = self.find(reservation_id).await?;

        if existing.correlation_token != correlation_token {
            warn!(
                reservation_id,
                "Payment confirmation carries a foreign correlation token"
            );
            return Err(BookingError::Validation(format!(
                "correlation token does not match reservation {}",
                reservation_id
            )));
        }

        match existing.status {
            ReservationStatus::Paid => return Ok(PaidTransition::AlreadyPaid(existing)),
            ReservationStatus::Cancelled => {
                return Err(BookingError::AlreadyFinalized(reservation_id))
            }
            ReservationStatus::Pending => {}
        }

        let updated = self
            .repos
            .reservations()
            .mark_paid(reservation_id, payment_reference, Utc::now())
            .await?;
        let current = self.find(reservation_id).await?;

        if !updated {
            // Lost a race: someone else finalized it between read and write.
            return match current.status {
                ReservationStatus::Paid => Ok(PaidTransition::AlreadyPaid(current)),
                _ => Err(BookingError::AlreadyFinalized(reservation_id)),
            };
        }

        info!(reservation_id, "Reservation paid");
        metrics::counter!("reservations_paid_total").increment(1);
        self.publish(Event::ReservationPaid(ReservationEvent::from(&current)));

        Ok(PaidTransition::Transitioned(current))
    }

    /// Materialise a paid reservation from payment metadata when no ledger
    /// row exists for the token. Uses the same overlap guard as
    /// `create_pending`.
    pub async fn record_paid(
        &self,
        metadata: &BookingMetadata,
        payment_reference: Option<String>,
    ) -> BookingResult<PaidTransition> {
        let new = metadata.to_paid_reservation(payment_reference.clone(), Utc::now())?;

        match self.insert(new, "record_paid").await {
            Ok(reservation) => {
                info!(
                    reservation_id = reservation.id,
                    hotel_id = reservation.hotel_id,
                    "Paid reservation recovered from payment metadata"
                );
                metrics::counter!("reservations_paid_total").increment(1);
                self.publish(Event::ReservationPaid(ReservationEvent::from(&reservation)));
                Ok(PaidTransition::Transitioned(reservation))
            }
            Err(err) => {
                // A duplicate delivery may have inserted the row first.
                if let Some(existing) = self
                    .repos
                    .reservations()
                    .find_by_correlation_token(&metadata.correlation_token)
                    .await?
                {
                    return self
                        .mark_paid(existing.id, &metadata.correlation_token, payment_reference)
                        .await;
                }
                Err(err)
            }
        }
    }

    /// `pending | paid → cancelled` by the owner or an admin.
    pub async fn cancel(&self, reservation_id: i32, actor: &Actor) -> BookingResult<Reservation> {
        let existing = self.find(reservation_id).await?;

        if !actor.can_manage(&existing.user_id) {
            return Err(BookingError::Forbidden(format!(
                "reservation {} belongs to another user",
                reservation_id
            )));
        }
        if !existing.holds_inventory() {
            return Err(BookingError::AlreadyFinalized(reservation_id));
        }

        let updated = self
            .repos
            .reservations()
            .cancel(reservation_id, Utc::now())
            .await?;
        if !updated {
            return Err(BookingError::AlreadyFinalized(reservation_id));
        }

        let cancelled = self.find(reservation_id).await?;
        info!(
            reservation_id,
            actor = %actor.user_id,
            previous_status = %existing.status,
            "Reservation cancelled"
        );
        metrics::counter!("reservations_cancelled_total").increment(1);
        self.publish(Event::ReservationCancelled(ReservationEvent::from(&cancelled)));

        Ok(cancelled)
    }

    /// One reservation, visible to its owner and admins.
    pub async fn get(&self, reservation_id: i32, actor: &Actor) -> BookingResult<Reservation> {
        let reservation = self.find(reservation_id).await?;
        if !actor.can_manage(&reservation.user_id) {
            return Err(BookingError::Forbidden(format!(
                "reservation {} belongs to another user",
                reservation_id
            )));
        }
        Ok(reservation)
    }

    /// Latest checkin first.
    pub async fn list_for_user(&self, user_id: &str) -> BookingResult<Vec<Reservation>> {
        self.repos.reservations().list_for_user(user_id).await
    }

    /// Admins see every reservation, everyone else their own.
    pub async fn list_for(&self, actor: &Actor) -> BookingResult<Vec<Reservation>> {
        if actor.is_admin {
            self.repos.reservations().list_all().await
        } else {
            self.list_for_user(&actor.user_id).await
        }
    }

    async fn find(&self, reservation_id: i32) -> BookingResult<Reservation> {
        self.repos
            .reservations()
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Reservation", reservation_id))
    }

    /// Guarded insert with one retry on storage contention. Contention that
    /// survives the retry is reported as no capacity.
    async fn insert(&self, new: NewReservation, operation: &str) -> BookingResult<Reservation> {
        let reservations = self.repos.reservations();
        let result = retry(
            &self.retry_policy,
            operation,
            || reservations.insert_if_available(new.clone()),
            BookingError::is_transient,
        )
        .await;

        match result {
            Err(BookingError::Conflict(msg)) => {
                warn!(operation, error = %msg, "Availability race lost after retry");
                Err(BookingError::Capacity)
            }
            other => other,
        }
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

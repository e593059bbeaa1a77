//! Booking events
//!
//! Everything the ledger, the payment handler and the reaper announce on the
//! event bus.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Reservation;

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A pending reservation now holds a date range
    ReservationCreated(ReservationEvent),
    /// Payment confirmed for a reservation
    ReservationPaid(ReservationEvent),
    /// Cancelled by the guest or an admin
    ReservationCancelled(ReservationEvent),
    /// One reaper batch finished
    ReservationsReaped(ReapedEvent),
    /// The guest was sent a booking confirmation
    ConfirmationSent(ReservationEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ReservationCreated(_) => "reservation_created",
            Event::ReservationPaid(_) => "reservation_paid",
            Event::ReservationCancelled(_) => "reservation_cancelled",
            Event::ReservationsReaped(_) => "reservations_reaped",
            Event::ConfirmationSent(_) => "confirmation_sent",
        }
    }

    /// Get the reservation ID if the event concerns a single reservation
    pub fn reservation_id(&self) -> Option<i32> {
        match self {
            Event::ReservationCreated(e)
            | Event::ReservationPaid(e)
            | Event::ReservationCancelled(e)
            | Event::ConfirmationSent(e) => Some(e.reservation_id),
            Event::ReservationsReaped(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationEvent {
    pub reservation_id: i32,
    pub hotel_id: i32,
    pub user_id: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub status: String,
    pub total_price_cents: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<&Reservation> for ReservationEvent {
    fn from(r: &Reservation) -> Self {
        Self {
            reservation_id: r.id,
            hotel_id: r.hotel_id,
            user_id: r.user_id.clone(),
            checkin: r.stay.checkin(),
            checkout: r.stay.checkout(),
            status: r.status.as_str().to_string(),
            total_price_cents: r.total_price_cents,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReapedEvent {
    pub count: u64,
    /// Pending reservations created before this instant were cancelled
    pub cutoff: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

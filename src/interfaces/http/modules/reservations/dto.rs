//! Reservation DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::CheckoutStarted;
use crate::domain::{BookingResult, Party, Reservation, StayDates};

/// Booking intent: the guest wants these dates at this hotel.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookingIntentRequest {
    #[validate(range(min = 1, message = "hotel_id must be positive"))]
    pub hotel_id: i32,
    /// First night, `YYYY-MM-DD`
    pub checkin: NaiveDate,
    /// Departure day, `YYYY-MM-DD`
    pub checkout: NaiveDate,
    #[validate(range(min = 1, max = 20, message = "1-20 adults"))]
    pub adults: u32,
    #[serde(default)]
    #[validate(range(max = 20, message = "at most 20 children"))]
    pub children: u32,
    #[serde(default)]
    pub pets: bool,
}

impl BookingIntentRequest {
    pub fn stay(&self) -> BookingResult<StayDates> {
        StayDates::new(self.checkin, self.checkout)
    }

    pub fn party(&self) -> BookingResult<Party> {
        Party::new(self.adults, self.children, self.pets)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: i32,
    pub hotel_id: i32,
    pub user_id: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub nights: i64,
    pub adults: u32,
    pub children: u32,
    pub pets: bool,
    /// `pending`, `paid` or `cancelled`
    pub status: String,
    pub total_price_cents: i64,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            hotel_id: r.hotel_id,
            user_id: r.user_id,
            checkin: r.stay.checkin(),
            checkout: r.stay.checkout(),
            nights: r.stay.nights(),
            adults: r.party.adults,
            children: r.party.children,
            pets: r.party.pets,
            status: r.status.to_string(),
            total_price_cents: r.total_price_cents,
            payment_reference: r.payment_reference,
            created_at: r.created_at,
            paid_at: r.paid_at,
            cancelled_at: r.cancelled_at,
        }
    }
}

/// Where to send the guest to pay.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingIntentResponse {
    pub reservation_id: i32,
    pub status: String,
    pub total_price_cents: i64,
    pub session_id: String,
    pub redirect_url: String,
}

impl From<CheckoutStarted> for BookingIntentResponse {
    fn from(started: CheckoutStarted) -> Self {
        Self {
            reservation_id: started.reservation.id,
            status: started.reservation.status.to_string(),
            total_price_cents: started.reservation.total_price_cents,
            session_id: started.session_id,
            redirect_url: started.redirect_url,
        }
    }
}

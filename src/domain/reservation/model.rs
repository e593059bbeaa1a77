//! Reservation domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{BookingError, BookingResult};

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Booking intent recorded, payment not yet confirmed
    Pending,
    /// Payment confirmed by the provider
    Paid,
    /// Cancelled by the guest, an admin, or the reaper
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Pending and paid reservations both block the dates they cover.
    pub fn holds_inventory(&self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }

    /// Statuses that count against availability.
    pub fn blocking() -> [Self; 2] {
        [Self::Pending, Self::Paid]
    }
}

impl FromStr for ReservationStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(BookingError::Storage(format!(
                "unknown reservation status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open stay `[checkin, checkout)` in calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    checkin: NaiveDate,
    checkout: NaiveDate,
}

impl StayDates {
    pub fn new(checkin: NaiveDate, checkout: NaiveDate) -> BookingResult<Self> {
        if checkin >= checkout {
            return Err(BookingError::Validation(format!(
                "checkin ({}) must be before checkout ({})",
                checkin, checkout
            )));
        }
        Ok(Self { checkin, checkout })
    }

    pub fn checkin(&self) -> NaiveDate {
        self.checkin
    }

    pub fn checkout(&self) -> NaiveDate {
        self.checkout
    }

    pub fn nights(&self) -> i64 {
        (self.checkout - self.checkin).num_days()
    }

    /// `a.checkin < b.checkout && b.checkin < a.checkout`; touching stays do not overlap.
    pub fn overlaps(&self, other: &StayDates) -> bool {
        self.checkin < other.checkout && other.checkin < self.checkout
    }
}

/// Who is staying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub adults: u32,
    pub children: u32,
    pub pets: bool,
}

impl Party {
    pub fn new(adults: u32, children: u32, pets: bool) -> BookingResult<Self> {
        if adults < 1 {
            return Err(BookingError::Validation(
                "at least one adult is required".to_string(),
            ));
        }
        Ok(Self {
            adults,
            children,
            pets,
        })
    }

    pub fn guests(&self) -> u32 {
        self.adults + self.children
    }
}

/// A reservation as recorded in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: i32,
    pub hotel_id: i32,
    pub user_id: String,
    pub stay: StayDates,
    pub party: Party,
    pub status: ReservationStatus,
    /// nights × nightly rate at creation time, in cents; never recomputed
    pub total_price_cents: i64,
    /// Idempotency key shared with the payment provider
    pub correlation_token: String,
    /// Provider-side id of the completed checkout session
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn holds_inventory(&self) -> bool {
        self.status.holds_inventory()
    }
}

/// Data for a ledger insert. The id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub hotel_id: i32,
    pub user_id: String,
    pub stay: StayDates,
    pub party: Party,
    pub status: ReservationStatus,
    pub total_price_cents: i64,
    pub correlation_token: String,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewReservation {
    /// A fresh pending reservation with a newly minted correlation token.
    pub fn pending(
        hotel_id: i32,
        user_id: impl Into<String>,
        stay: StayDates,
        party: Party,
        total_price_cents: i64,
    ) -> Self {
        Self {
            hotel_id,
            user_id: user_id.into(),
            stay,
            party,
            status: ReservationStatus::Pending,
            total_price_cents,
            correlation_token: uuid::Uuid::new_v4().to_string(),
            payment_reference: None,
            created_at: Utc::now(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

//! Payment provider port
//!
//! The booking core hands the provider a [`CheckoutRequest`] and gets back a
//! hosted-checkout redirect. Completion arrives later as a signed
//! notification, which a [`PaymentNotificationVerifier`] authenticates and
//! turns into a [`PaymentEvent`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    BookingError, BookingResult, NewReservation, Party, Reservation, ReservationStatus, StayDates,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Booking details echoed back by the provider in the completion
/// notification. Serialized as a flat string map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingMetadata {
    pub correlation_token: String,
    pub reservation_id: Option<i32>,
    pub hotel_id: i32,
    pub user_id: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub pets: bool,
    pub total_price_cents: i64,
}

impl BookingMetadata {
    pub fn from_reservation(r: &Reservation) -> Self {
        Self {
            correlation_token: r.correlation_token.clone(),
            reservation_id: Some(r.id),
            hotel_id: r.hotel_id,
            user_id: r.user_id.clone(),
            checkin: r.stay.checkin(),
            checkout: r.stay.checkout(),
            adults: r.party.adults,
            children: r.party.children,
            pets: r.party.pets,
            total_price_cents: r.total_price_cents,
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("correlation_token", self.correlation_token.clone())];
        if let Some(id) = self.reservation_id {
            pairs.push(("reservation_id", id.to_string()));
        }
        pairs.extend([
            ("hotel_id", self.hotel_id.to_string()),
            ("user_id", self.user_id.clone()),
            ("checkin", self.checkin.format(DATE_FORMAT).to_string()),
            ("checkout", self.checkout.format(DATE_FORMAT).to_string()),
            ("adults", self.adults.to_string()),
            ("children", self.children.to_string()),
            ("pets", self.pets.to_string()),
            ("total_price_cents", self.total_price_cents.to_string()),
        ]);
        pairs
    }

    /// Parse the provider's metadata map. Any missing or malformed field is a
    /// `Validation` error.
    pub fn from_map(map: &HashMap<String, String>) -> BookingResult<Self> {
        let metadata = Self {
            correlation_token: required(map, "correlation_token")?.to_string(),
            reservation_id: optional(map, "reservation_id")
                .map(|v| parse(v, "reservation_id"))
                .transpose()?,
            hotel_id: parse(required(map, "hotel_id")?, "hotel_id")?,
            user_id: required(map, "user_id")?.to_string(),
            checkin: parse_date(required(map, "checkin")?, "checkin")?,
            checkout: parse_date(required(map, "checkout")?, "checkout")?,
            adults: parse(required(map, "adults")?, "adults")?,
            children: optional(map, "children")
                .map(|v| parse(v, "children"))
                .transpose()?
                .unwrap_or(0),
            pets: optional(map, "pets")
                .map(|v| parse(v, "pets"))
                .transpose()?
                .unwrap_or(false),
            total_price_cents: parse(required(map, "total_price_cents")?, "total_price_cents")?,
        };

        if metadata.total_price_cents < 0 {
            return Err(BookingError::Validation(
                "invalid metadata field 'total_price_cents'".to_string(),
            ));
        }
        Ok(metadata)
    }

    pub fn stay(&self) -> BookingResult<StayDates> {
        StayDates::new(self.checkin, self.checkout)
    }

    pub fn party(&self) -> BookingResult<Party> {
        Party::new(self.adults, self.children, self.pets)
    }

    /// A ledger row that is already paid, for when the pending row is gone.
    pub fn to_paid_reservation(
        &self,
        payment_reference: Option<String>,
        now: DateTime<Utc>,
    ) -> BookingResult<NewReservation> {
        Ok(NewReservation {
            hotel_id: self.hotel_id,
            user_id: self.user_id.clone(),
            stay: self.stay()?,
            party: self.party()?,
            status: ReservationStatus::Paid,
            total_price_cents: self.total_price_cents,
            correlation_token: self.correlation_token.clone(),
            payment_reference,
            created_at: now,
        })
    }
}

fn optional<'a>(map: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn required<'a>(map: &'a HashMap<String, String>, key: &str) -> BookingResult<&'a str> {
    optional(map, key)
        .ok_or_else(|| BookingError::Validation(format!("missing metadata field '{}'", key)))
}

fn parse<T: std::str::FromStr>(value: &str, key: &str) -> BookingResult<T> {
    value
        .parse()
        .map_err(|_| BookingError::Validation(format!("invalid metadata field '{}'", key)))
}

fn parse_date(value: &str, key: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| BookingError::Validation(format!("invalid metadata field '{}'", key)))
}

/// What the core asks the provider to charge.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub hotel_name: String,
    pub metadata: BookingMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> BookingResult<CheckoutSession>;
}

/// An authenticated provider notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// Hosted checkout finished and the money is captured
    CheckoutCompleted {
        event_id: String,
        session_id: String,
        metadata: BookingMetadata,
    },
    /// Authentic, but nothing for the ledger to do
    Ignored { event_id: String, event_type: String },
}

pub trait PaymentNotificationVerifier: Send + Sync {
    /// Authenticate `payload` against its signature header, then decode it.
    /// Signature problems are `InvalidSignature`; a well-signed payload with
    /// bad content is `Validation`.
    fn verify(&self, signature_header: Option<&str>, payload: &[u8])
        -> BookingResult<PaymentEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookingMetadata {
        BookingMetadata {
            correlation_token: "tok-1".into(),
            reservation_id: Some(7),
            hotel_id: 3,
            user_id: "u-1".into(),
            checkin: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            checkout: NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            adults: 2,
            children: 1,
            pets: false,
            total_price_cents: 400_00,
        }
    }

    fn as_map(m: &BookingMetadata) -> HashMap<String, String> {
        m.to_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn parses_what_it_writes() {
        let m = sample();
        assert_eq!(BookingMetadata::from_map(&as_map(&m)).unwrap(), m);
    }

    #[test]
    fn missing_field_is_validation_error() {
        let mut map = as_map(&sample());
        map.remove("hotel_id");
        let err = BookingMetadata::from_map(&map).unwrap_err();
        assert_eq!(
            err,
            BookingError::Validation("missing metadata field 'hotel_id'".into())
        );
    }

    #[test]
    fn malformed_date_is_validation_error() {
        let mut map = as_map(&sample());
        map.insert("checkin".into(), "01/06/2025".into());
        assert!(matches!(
            BookingMetadata::from_map(&map),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn optional_fields_default() {
        let mut map = as_map(&sample());
        map.remove("reservation_id");
        map.remove("children");
        map.remove("pets");
        let m = BookingMetadata::from_map(&map).unwrap();
        assert_eq!(m.reservation_id, None);
        assert_eq!(m.children, 0);
        assert!(!m.pets);
    }

    #[test]
    fn paid_reservation_rejects_inverted_dates() {
        let mut m = sample();
        std::mem::swap(&mut m.checkin, &mut m.checkout);
        assert!(m.to_paid_reservation(None, Utc::now()).is_err());
    }
}

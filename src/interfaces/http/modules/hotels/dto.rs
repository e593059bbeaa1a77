//! Hotel catalog DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::Availability;
use crate::domain::{BookingError, BookingResult, Hotel, NewHotel, Party, StayDates};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HotelDto {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub country: String,
    pub nightly_rate_cents: i64,
    pub adults_per_room: u32,
    pub children_per_room: u32,
    pub pets_allowed: bool,
    /// Price of the requested stay, when dates were given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HotelDto {
    pub fn new(hotel: Hotel, stay: Option<&StayDates>) -> Self {
        let total_price_cents = stay.and_then(|s| hotel.quote(s).ok());
        Self {
            id: hotel.id,
            name: hotel.name,
            city: hotel.city,
            country: hotel.country,
            nightly_rate_cents: hotel.nightly_rate_cents,
            adults_per_room: hotel.adults_per_room,
            children_per_room: hotel.children_per_room,
            pets_allowed: hotel.pets_allowed,
            total_price_cents,
            created_at: hotel.created_at,
            updated_at: hotel.updated_at,
        }
    }
}

/// Stay and party given as query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StayQuery {
    /// First night, `YYYY-MM-DD`
    pub checkin: Option<NaiveDate>,
    /// Departure day, `YYYY-MM-DD`
    pub checkout: Option<NaiveDate>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub pets: Option<bool>,
}

impl StayQuery {
    /// Both dates or neither.
    pub fn stay(&self) -> BookingResult<Option<StayDates>> {
        match (self.checkin, self.checkout) {
            (Some(checkin), Some(checkout)) => StayDates::new(checkin, checkout).map(Some),
            (None, None) => Ok(None),
            _ => Err(BookingError::Validation(
                "checkin and checkout must be given together".to_string(),
            )),
        }
    }

    /// `None` when no party field was given; a lone `children` or `pets`
    /// implies one adult.
    pub fn party(&self) -> BookingResult<Option<Party>> {
        if self.adults.is_none() && self.children.is_none() && self.pets.is_none() {
            return Ok(None);
        }
        Party::new(
            self.adults.unwrap_or(1),
            self.children.unwrap_or(0),
            self.pets.unwrap_or(false),
        )
        .map(Some)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Substring of city, country or hotel name
    pub destination: Option<String>,
    pub checkin: Option<NaiveDate>,
    pub checkout: Option<NaiveDate>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub pets: Option<bool>,
    pub max_nightly_rate_cents: Option<i64>,
}

impl SearchQuery {
    pub fn stay_query(&self) -> StayQuery {
        StayQuery {
            checkin: self.checkin,
            checkout: self.checkout,
            adults: self.adults,
            children: self.children,
            pets: self.pets,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub hotel_id: i32,
    pub available: bool,
    /// Why the hotel cannot take the party, if it cannot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub nights: i64,
    pub total_price_cents: i64,
}

impl AvailabilityResponse {
    pub fn new(hotel: &Hotel, stay: &StayDates, availability: &Availability) -> BookingResult<Self> {
        Ok(Self {
            hotel_id: hotel.id,
            available: availability.is_available(),
            reason: availability.reason().map(str::to_string),
            nights: stay.nights(),
            total_price_cents: hotel.quote(stay)?,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateHotelRequest {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "country is required"))]
    pub country: String,
    #[validate(range(min = 0, message = "rate must not be negative"))]
    pub nightly_rate_cents: i64,
    #[validate(range(min = 1, max = 20, message = "a room holds 1-20 adults"))]
    pub adults_per_room: u32,
    #[serde(default)]
    #[validate(range(max = 20))]
    pub children_per_room: u32,
    #[serde(default)]
    pub pets_allowed: bool,
}

impl From<CreateHotelRequest> for NewHotel {
    fn from(r: CreateHotelRequest) -> Self {
        Self {
            name: r.name,
            city: r.city,
            country: r.country,
            nightly_rate_cents: r.nightly_rate_cents,
            adults_per_room: r.adults_per_room,
            children_per_room: r.children_per_room,
            pets_allowed: r.pets_allowed,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRateRequest {
    #[validate(range(min = 0, message = "rate must not be negative"))]
    pub nightly_rate_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn half_given_stay_is_rejected() {
        let q = StayQuery {
            checkin: Some(date("2025-06-01")),
            ..Default::default()
        };
        assert!(matches!(q.stay(), Err(BookingError::Validation(_))));
        assert!(StayQuery::default().stay().unwrap().is_none());
    }

    #[test]
    fn party_defaults_to_one_adult() {
        let q = StayQuery {
            pets: Some(true),
            ..Default::default()
        };
        let party = q.party().unwrap().unwrap();
        assert_eq!(party.adults, 1);
        assert!(party.pets);
        assert!(StayQuery::default().party().unwrap().is_none());

        let q = StayQuery {
            adults: Some(0),
            ..Default::default()
        };
        assert!(q.party().is_err());
    }
}

//! Hotel catalog entity

use chrono::{DateTime, Utc};

use crate::domain::reservation::{Party, StayDates};
use crate::shared::{BookingError, BookingResult};

/// A hotel, modelled as a single bookable room.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub country: String,
    /// Current nightly rate in cents
    pub nightly_rate_cents: i64,
    pub adults_per_room: u32,
    pub children_per_room: u32,
    pub pets_allowed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hotel {
    /// Price of `stay` at the current nightly rate, in cents.
    pub fn quote(&self, stay: &StayDates) -> BookingResult<i64> {
        self.nightly_rate_cents
            .checked_mul(stay.nights())
            .ok_or_else(|| BookingError::Validation("stay price overflows".to_string()))
    }

    /// Room capacity only; pets are checked separately.
    pub fn has_room_for(&self, party: &Party) -> bool {
        party.adults <= self.adults_per_room && party.children <= self.children_per_room
    }

    pub fn accepts_pets_of(&self, party: &Party) -> bool {
        !party.pets || self.pets_allowed
    }
}

/// Data for adding a hotel to the catalog.
#[derive(Debug, Clone)]
pub struct NewHotel {
    pub name: String,
    pub city: String,
    pub country: String,
    pub nightly_rate_cents: i64,
    pub adults_per_room: u32,
    pub children_per_room: u32,
    pub pets_allowed: bool,
}

/// Catalog search filters. Every field is optional; absent fields do not
/// constrain the result.
#[derive(Debug, Clone, Default)]
pub struct HotelSearch {
    /// Case-insensitive substring of the hotel name, city, or country
    pub destination: Option<String>,
    /// Only hotels with no pending/paid reservation overlapping these dates
    pub stay: Option<StayDates>,
    pub party: Option<Party>,
    pub max_nightly_rate_cents: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hotel() -> Hotel {
        Hotel {
            id: 1,
            name: "Le Parisien Luxe".into(),
            city: "Paris".into(),
            country: "France".into(),
            nightly_rate_cents: 100_00,
            adults_per_room: 2,
            children_per_room: 1,
            pets_allowed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn quote_is_nights_times_rate() {
        let stay = StayDates::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
        )
        .unwrap();
        assert_eq!(hotel().quote(&stay).unwrap(), 400_00);
    }

    #[test]
    fn capacity_and_pets_are_separate_checks() {
        let h = hotel();
        assert!(h.has_room_for(&Party::new(2, 1, false).unwrap()));
        assert!(!h.has_room_for(&Party::new(3, 0, false).unwrap()));
        assert!(!h.has_room_for(&Party::new(1, 2, false).unwrap()));

        let with_dog = Party::new(1, 0, true).unwrap();
        assert!(h.has_room_for(&with_dog));
        assert!(!h.accepts_pets_of(&with_dog));
        assert!(h.accepts_pets_of(&Party::new(1, 0, false).unwrap()));
    }
}

//! Availability checks
//!
//! Read-only: answers whether a hotel can take a party for a stay right now.
//! Pending reservations hold inventory just like paid ones.

use std::sync::Arc;

use log::debug;

use crate::domain::{
    BookingError, BookingResult, Hotel, Party, RepositoryProvider, StayDates,
};

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// More adults or children than the room takes
    PartyTooLarge,
    PetsNotAllowed,
    /// Overlapping pending/paid reservations, by id
    Booked(Vec<i32>),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Available => None,
            Self::PartyTooLarge => Some("party exceeds room capacity"),
            Self::PetsNotAllowed => Some("pets are not allowed"),
            Self::Booked(_) => Some("dates already booked"),
        }
    }
}

pub struct AvailabilityChecker {
    repos: Arc<dyn RepositoryProvider>,
}

impl AvailabilityChecker {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn is_available(
        &self,
        hotel_id: i32,
        stay: &StayDates,
        party: &Party,
    ) -> BookingResult<bool> {
        Ok(self.check(hotel_id, stay, party).await?.is_available())
    }

    /// Fails with `NotFound` for an unknown hotel.
    pub async fn check(
        &self,
        hotel_id: i32,
        stay: &StayDates,
        party: &Party,
    ) -> BookingResult<Availability> {
        let hotel = self
            .repos
            .hotels()
            .find_by_id(hotel_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Hotel", hotel_id))?;
        self.check_hotel(&hotel, stay, party).await
    }

    pub async fn check_hotel(
        &self,
        hotel: &Hotel,
        stay: &StayDates,
        party: &Party,
    ) -> BookingResult<Availability> {
        if !hotel.has_room_for(party) {
            return Ok(Availability::PartyTooLarge);
        }
        if !hotel.accepts_pets_of(party) {
            return Ok(Availability::PetsNotAllowed);
        }

        let blocking = self
            .repos
            .reservations()
            .find_blocking(hotel.id, stay)
            .await?;
        if !blocking.is_empty() {
            debug!(
                "Hotel {} unavailable {} → {}: {} overlapping reservation(s)",
                hotel.id,
                stay.checkin(),
                stay.checkout(),
                blocking.len()
            );
            return Ok(Availability::Booked(blocking.iter().map(|r| r.id).collect()));
        }

        Ok(Availability::Available)
    }
}

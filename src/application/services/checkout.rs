//! Checkout: booking intent plus hosted payment session.

use std::sync::Arc;

use tracing::{error, info};

use super::ledger::ReservationLedger;
use crate::application::ports::{BookingMetadata, CheckoutRequest, PaymentProvider};
use crate::domain::{
    Actor, BookingError, BookingResult, Party, RepositoryProvider, Reservation, StayDates,
};

/// A pending reservation and where to send the guest to pay for it.
#[derive(Debug, Clone)]
pub struct CheckoutStarted {
    pub reservation: Reservation,
    pub session_id: String,
    pub redirect_url: String,
}

pub struct CheckoutService {
    repos: Arc<dyn RepositoryProvider>,
    ledger: Arc<ReservationLedger>,
    provider: Arc<dyn PaymentProvider>,
}

impl CheckoutService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        ledger: Arc<ReservationLedger>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            repos,
            ledger,
            provider,
        }
    }

    /// Create the pending reservation, then open a payment session for it.
    /// If the provider fails, the reservation is cancelled again so it stops
    /// holding the dates.
    pub async fn start(
        &self,
        hotel_id: i32,
        user_id: &str,
        stay: StayDates,
        party: Party,
    ) -> BookingResult<CheckoutStarted> {
        let hotel = self
            .repos
            .hotels()
            .find_by_id(hotel_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Hotel", hotel_id))?;

        let reservation = self
            .ledger
            .create_pending(hotel_id, user_id, stay, party)
            .await?;

        let request = CheckoutRequest {
            hotel_name: hotel.name,
            metadata: BookingMetadata::from_reservation(&reservation),
        };

        match self.provider.create_checkout_session(&request).await {
            Ok(session) => {
                info!(
                    reservation_id = reservation.id,
                    provider = self.provider.name(),
                    session_id = %session.session_id,
                    "Checkout session created"
                );
                Ok(CheckoutStarted {
                    reservation,
                    session_id: session.session_id,
                    redirect_url: session.redirect_url,
                })
            }
            Err(err) => {
                error!(
                    reservation_id = reservation.id,
                    provider = self.provider.name(),
                    error = %err,
                    "Checkout session failed, releasing reservation"
                );
                if let Err(release_err) = self.ledger.cancel(reservation.id, &Actor::system()).await
                {
                    error!(
                        reservation_id = reservation.id,
                        error = %release_err,
                        "Failed to release reservation; the reaper will reclaim it"
                    );
                }
                Err(match err {
                    BookingError::Payment(msg) => BookingError::Payment(msg),
                    other => BookingError::Payment(other.to_string()),
                })
            }
        }
    }
}

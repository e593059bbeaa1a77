//! Payment Confirmation Handler
//!
//! Turns an authenticated "checkout completed" notification into a paid
//! ledger entry. The provider delivers at least once, so every step is
//! keyed on the correlation token and safe to repeat.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::ledger::{PaidTransition, ReservationLedger};
use crate::application::ports::{
    BookingMetadata, ConfirmationNotifier, PaymentEvent, PaymentNotificationVerifier,
};
use crate::domain::{BookingError, BookingResult, RepositoryProvider, Reservation, ReservationStatus};

/// What a webhook delivery did.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// This delivery marked the reservation paid
    Confirmed(Reservation),
    /// Already paid by an earlier delivery; nothing changed
    Duplicate(Reservation),
    /// Authentic event of a type the ledger does not act on
    Ignored { event_type: String },
}

impl WebhookOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Confirmed(_) => "confirmed",
            Self::Duplicate(_) => "duplicate",
            Self::Ignored { .. } => "ignored",
        }
    }
}

pub struct PaymentConfirmationHandler {
    repos: Arc<dyn RepositoryProvider>,
    ledger: Arc<ReservationLedger>,
    verifier: Arc<dyn PaymentNotificationVerifier>,
    notifier: Arc<dyn ConfirmationNotifier>,
}

impl PaymentConfirmationHandler {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        ledger: Arc<ReservationLedger>,
        verifier: Arc<dyn PaymentNotificationVerifier>,
        notifier: Arc<dyn ConfirmationNotifier>,
    ) -> Self {
        Self {
            repos,
            ledger,
            verifier,
            notifier,
        }
    }

    /// Verify, then apply, one raw notification.
    pub async fn handle(
        &self,
        signature_header: Option<&str>,
        payload: &[u8],
    ) -> BookingResult<WebhookOutcome> {
        let result = self.process(signature_header, payload).await;

        let outcome = match &result {
            Ok(outcome) => outcome.label(),
            Err(BookingError::InvalidSignature(_)) => "invalid_signature",
            Err(BookingError::Validation(_)) => "invalid_payload",
            Err(BookingError::Capacity) => "conflict",
            Err(_) => "error",
        };
        metrics::counter!("payment_webhooks_total", "outcome" => outcome).increment(1);

        result
    }

    async fn process(
        &self,
        signature_header: Option<&str>,
        payload: &[u8],
    ) -> BookingResult<WebhookOutcome> {
        let event = self.verifier.verify(signature_header, payload).map_err(|e| {
            warn!(error = %e, "Rejected payment notification");
            e
        })?;

        match event {
            PaymentEvent::Ignored {
                event_id,
                event_type,
            } => {
                info!(%event_id, %event_type, "Payment notification acknowledged without action");
                Ok(WebhookOutcome::Ignored { event_type })
            }
            PaymentEvent::CheckoutCompleted {
                event_id,
                session_id,
                metadata,
            } => {
                info!(
                    %event_id,
                    %session_id,
                    correlation_token = %metadata.correlation_token,
                    "Payment completed"
                );
                let transition = self.confirm(&metadata, session_id).await?;
                Ok(self.finish(transition).await)
            }
        }
    }

    async fn confirm(
        &self,
        metadata: &BookingMetadata,
        session_id: String,
    ) -> BookingResult<PaidTransition> {
        let token = metadata.correlation_token.as_str();
        let existing = self
            .repos
            .reservations()
            .find_by_correlation_token(token)
            .await?;

        match existing {
            Some(r) if r.status == ReservationStatus::Paid => Ok(PaidTransition::AlreadyPaid(r)),
            Some(r) => {
                let result = self.ledger.mark_paid(r.id, token, Some(session_id)).await;
                if let Err(BookingError::AlreadyFinalized(id)) = &result {
                    error!(
                        reservation_id = id,
                        correlation_token = token,
                        "Payment received for a cancelled reservation; manual refund required"
                    );
                }
                result
            }
            None => {
                warn!(
                    correlation_token = token,
                    hotel_id = metadata.hotel_id,
                    "No ledger row for paid session, recovering from metadata"
                );
                let result = self.ledger.record_paid(metadata, Some(session_id)).await;
                if let Err(BookingError::Capacity) = &result {
                    error!(
                        correlation_token = token,
                        hotel_id = metadata.hotel_id,
                        checkin = %metadata.checkin,
                        checkout = %metadata.checkout,
                        "Paid stay overlaps an existing booking; manual refund required"
                    );
                }
                result
            }
        }
    }

    async fn finish(&self, transition: PaidTransition) -> WebhookOutcome {
        match transition {
            PaidTransition::Transitioned(reservation) => {
                if let Err(e) = self.notifier.reservation_confirmed(&reservation).await {
                    warn!(
                        reservation_id = reservation.id,
                        error = %e,
                        "Confirmation notice failed"
                    );
                }
                WebhookOutcome::Confirmed(reservation)
            }
            PaidTransition::AlreadyPaid(reservation) => {
                info!(reservation_id = reservation.id, "Duplicate payment notification");
                WebhookOutcome::Duplicate(reservation)
            }
        }
    }
}

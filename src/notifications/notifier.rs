//! Confirmation notice adapters

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::event_bus::SharedEventBus;
use super::events::{Event, ReservationEvent};
use crate::application::ports::ConfirmationNotifier;
use crate::domain::{BookingResult, Reservation};

/// Publishes `ConfirmationSent` so subscribers (mailers, dashboards) can
/// deliver the notice.
pub struct EventBusNotifier {
    bus: SharedEventBus,
}

impl EventBusNotifier {
    pub fn new(bus: SharedEventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl ConfirmationNotifier for EventBusNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> BookingResult<()> {
        info!(
            reservation_id = reservation.id,
            user_id = %reservation.user_id,
            "📧 Booking confirmation queued"
        );
        self.bus
            .publish(Event::ConfirmationSent(ReservationEvent::from(reservation)));
        Ok(())
    }
}

/// Only writes the notice to the log.
#[derive(Default)]
pub struct LoggingNotifier;

#[async_trait]
impl ConfirmationNotifier for LoggingNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> BookingResult<()> {
        info!(
            reservation_id = reservation.id,
            user_id = %reservation.user_id,
            hotel_id = reservation.hotel_id,
            checkin = %reservation.stay.checkin(),
            checkout = %reservation.stay.checkout(),
            total_price_cents = reservation.total_price_cents,
            "📧 Booking confirmed"
        );
        Ok(())
    }
}

/// Calls every notifier in order. A failing notifier does not stop the
/// rest; the first error is returned once all have run.
pub struct FanoutNotifier {
    notifiers: Vec<Arc<dyn ConfirmationNotifier>>,
}

impl FanoutNotifier {
    pub fn new(notifiers: Vec<Arc<dyn ConfirmationNotifier>>) -> Self {
        Self { notifiers }
    }
}

#[async_trait]
impl ConfirmationNotifier for FanoutNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> BookingResult<()> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.reservation_confirmed(reservation).await {
                warn!(reservation_id = reservation.id, error = %e, "Confirmation channel failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Party, ReservationStatus, StayDates};
    use crate::notifications::create_event_bus;
    use chrono::{NaiveDate, Utc};

    fn reservation() -> Reservation {
        Reservation {
            id: 5,
            hotel_id: 1,
            user_id: "u-1".into(),
            stay: StayDates::new(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            )
            .unwrap(),
            party: Party::new(2, 0, false).unwrap(),
            status: ReservationStatus::Paid,
            total_price_cents: 40_000,
            correlation_token: "tok".into(),
            payment_reference: Some("cs_1".into()),
            created_at: Utc::now(),
            paid_at: Some(Utc::now()),
            cancelled_at: None,
        }
    }

    #[tokio::test]
    async fn event_bus_notifier_publishes_confirmation() {
        let bus = create_event_bus();
        let mut sub = bus.subscribe();
        let notifier = EventBusNotifier::new(bus.clone());

        notifier.reservation_confirmed(&reservation()).await.unwrap();

        let msg = sub.recv().await.unwrap();
        assert_eq!(msg.event.event_type(), "confirmation_sent");
        assert_eq!(msg.event.reservation_id(), Some(5));
    }

    struct Broken;

    #[async_trait]
    impl ConfirmationNotifier for Broken {
        async fn reservation_confirmed(&self, _: &Reservation) -> BookingResult<()> {
            Err(crate::domain::BookingError::Notification("relay down".into()))
        }
    }

    #[tokio::test]
    async fn fanout_keeps_going_after_a_failure() {
        let bus = create_event_bus();
        let mut sub = bus.subscribe();
        let broken: Arc<dyn ConfirmationNotifier> = Arc::new(Broken);
        let publisher: Arc<dyn ConfirmationNotifier> = Arc::new(EventBusNotifier::new(bus.clone()));
        let fanout = FanoutNotifier::new(vec![broken, publisher]);

        let err = fanout.reservation_confirmed(&reservation()).await.unwrap_err();
        assert!(err.to_string().contains("relay down"));

        let msg = sub.recv().await.unwrap();
        assert_eq!(msg.event.event_type(), "confirmation_sent");
    }

    #[tokio::test]
    async fn logging_notifier_never_fails() {
        assert!(LoggingNotifier.reservation_confirmed(&reservation()).await.is_ok());
    }
}

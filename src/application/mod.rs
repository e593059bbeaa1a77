//! Application layer: the booking core services and their outbound ports.

pub mod ports;
pub mod services;

pub use ports::{
    BookingMetadata, CheckoutRequest, CheckoutSession, ConfirmationNotifier, MailTransport,
    OutgoingMail, PaymentEvent, PaymentNotificationVerifier, PaymentProvider,
};
pub use services::{
    Availability, AvailabilityChecker, CheckoutService, CheckoutStarted, PaidTransition,
    PaymentConfirmationHandler, ReaperConfig, ReservationLedger, StaleReservationReaper,
    WebhookOutcome,
};

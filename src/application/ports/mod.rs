//! Application ports (hexagonal architecture boundaries)
//!
//! Outbound interfaces the booking core calls into: the payment provider,
//! the guest-facing confirmation channel and the mail transport behind it.
//! Adapters live in `infrastructure` and `notifications`.

pub mod mail;
pub mod notifier;
pub mod payment;

pub use mail::{MailTransport, OutgoingMail};
pub use notifier::ConfirmationNotifier;
pub use payment::{
    BookingMetadata, CheckoutRequest, CheckoutSession, PaymentEvent, PaymentNotificationVerifier,
    PaymentProvider,
};

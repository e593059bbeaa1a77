//! Application services

mod availability;
mod checkout;
mod ledger;
mod payments;
mod reaper;

pub use availability::{Availability, AvailabilityChecker};
pub use checkout::{CheckoutService, CheckoutStarted};
pub use ledger::{PaidTransition, ReservationLedger};
pub use payments::{PaymentConfirmationHandler, WebhookOutcome};
pub use reaper::{ReaperConfig, StaleReservationReaper};

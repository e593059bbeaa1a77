use async_trait::async_trait;

use crate::domain::{BookingResult, Reservation};

/// Best-effort channel telling a guest their booking is confirmed.
///
/// Callers log failures and carry on; a settled payment is never rolled back
/// because a confirmation could not be delivered.
#[async_trait]
pub trait ConfirmationNotifier: Send + Sync {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> BookingResult<()>;
}

//! Reservation repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{NewReservation, Reservation, StayDates};
use crate::shared::BookingResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert `reservation` unless a pending or paid reservation for the same
    /// hotel overlaps its stay. The overlap test and the insert are atomic;
    /// a blocked insert fails with `BookingError::Capacity`.
    async fn insert_if_available(&self, reservation: NewReservation) -> BookingResult<Reservation>;

    async fn find_by_id(&self, id: i32) -> BookingResult<Option<Reservation>>;

    async fn find_by_correlation_token(&self, token: &str) -> BookingResult<Option<Reservation>>;

    /// Pending or paid reservations of `hotel_id` overlapping `stay`.
    async fn find_blocking(&self, hotel_id: i32, stay: &StayDates)
        -> BookingResult<Vec<Reservation>>;

    /// `pending → paid`. Returns `false` when the row was not pending.
    async fn mark_paid(
        &self,
        id: i32,
        payment_reference: Option<String>,
        paid_at: DateTime<Utc>,
    ) -> BookingResult<bool>;

    /// `pending | paid → cancelled`. Returns `false` when already cancelled or missing.
    async fn cancel(&self, id: i32, cancelled_at: DateTime<Utc>) -> BookingResult<bool>;

    /// Reservations of one user, latest checkin first.
    async fn list_for_user(&self, user_id: &str) -> BookingResult<Vec<Reservation>>;

    /// Every reservation, latest checkin first.
    async fn list_all(&self) -> BookingResult<Vec<Reservation>>;

    /// Cancel every pending reservation created before `created_before`
    /// in one statement. Returns the number of rows affected.
    async fn cancel_stale_pending(
        &self,
        created_before: DateTime<Utc>,
        cancelled_at: DateTime<Utc>,
    ) -> BookingResult<u64>;
}

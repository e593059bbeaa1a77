//! Hotel repository interface

use async_trait::async_trait;

use super::model::{Hotel, HotelSearch, NewHotel};
use crate::shared::BookingResult;

#[async_trait]
pub trait HotelRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> BookingResult<Option<Hotel>>;

    async fn create(&self, hotel: NewHotel) -> BookingResult<Hotel>;

    /// Change the rate used for future quotes. Existing reservations keep
    /// the price they were created with.
    async fn update_nightly_rate(&self, id: i32, nightly_rate_cents: i64) -> BookingResult<Hotel>;

    async fn search(&self, filter: &HotelSearch) -> BookingResult<Vec<Hotel>>;
}

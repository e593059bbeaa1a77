//! Repository access for the domain layer
//!
//! `RepositoryProvider` hands out per-aggregate repositories that share one
//! connection pool. Services take an `Arc<dyn RepositoryProvider>` and ask
//! only for the repository they need:
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) -> BookingResult<()> {
//!     let hotel = repos.hotels().find_by_id(7).await?;
//!     let mine = repos.reservations().list_for_user("u-1").await?;
//!     Ok(())
//! }
//! ```

use super::hotel::HotelRepository;
use super::reservation::ReservationRepository;
use super::user::UserRepository;

pub trait RepositoryProvider: Send + Sync {
    fn hotels(&self) -> &dyn HotelRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn users(&self) -> &dyn UserRepository;
}

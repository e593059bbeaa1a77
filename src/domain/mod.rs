pub mod hotel;
pub mod repositories;
pub mod reservation;
pub mod user;

// Re-export commonly used types
pub use hotel::{Hotel, HotelRepository, HotelSearch, NewHotel};
pub use repositories::RepositoryProvider;
pub use reservation::{
    NewReservation, Party, Reservation, ReservationRepository, ReservationStatus, StayDates,
};
pub use user::{Actor, NewUser, User, UserRepository, UserRole};

pub use crate::shared::errors::{BookingError, BookingResult};

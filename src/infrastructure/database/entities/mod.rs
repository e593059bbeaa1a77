//! Database entities module

pub mod hotel;
pub mod reservation;
pub mod user;

pub use hotel::Entity as Hotel;
pub use reservation::Entity as Reservation;
pub use user::Entity as User;

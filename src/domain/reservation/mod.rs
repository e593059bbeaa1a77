//! Reservation aggregate
//!
//! Contains the Reservation entity, stay/party value types, and the
//! repository interface backing the ledger.

pub mod model;
pub mod repository;

pub use model::{NewReservation, Party, Reservation, ReservationStatus, StayDates};
pub use repository::ReservationRepository;

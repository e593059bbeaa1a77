//! Hotel catalog aggregate

pub mod model;
pub mod repository;

pub use model::{Hotel, HotelSearch, NewHotel};
pub use repository::HotelRepository;

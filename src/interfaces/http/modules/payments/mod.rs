//! Payment notifications from the checkout provider

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

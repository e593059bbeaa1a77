//! Hotel catalog: search, lookup, availability, admin maintenance

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;

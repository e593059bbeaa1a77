pub mod admin;
pub mod auth;
pub mod health;
pub mod hotels;
pub mod metrics;
pub mod payments;
pub mod request_id;
pub mod reservations;

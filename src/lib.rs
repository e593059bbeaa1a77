//! # JustDreams Booking
//!
//! Hotel booking service: availability checks, a reservation ledger that
//! never double-books a stay, hosted checkout, and idempotent payment
//! confirmation from signed provider webhooks.
//!
//! ## Architecture
//!
//! - **domain**: entities, value types and repository traits
//! - **application**: booking core services and their outbound ports
//! - **infrastructure**: SeaORM storage, payment provider client, crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **notifications**: in-process booking event bus
//! - **shared**: error taxonomy, retry, shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod notifications;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::http::{create_api_router, AppState};

pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};

pub use shared::{BookingError, BookingResult};

//! Notifications module
//!
//! In-process broadcast of booking events, plus the confirmation-notice
//! adapters: the event bus, guest mail, and a fan-out over both.
//!
//! # Usage
//! ```ignore
//! use justdreams_booking::notifications::{create_event_bus, Event, ReapedEvent};
//! use chrono::Utc;
//!
//! let event_bus = create_event_bus();
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus.publish(Event::ReservationsReaped(ReapedEvent {
//!     count: 2,
//!     cutoff: Utc::now(),
//!     timestamp: Utc::now(),
//! }));
//! ```

pub mod event_bus;
pub mod events;
pub mod mail;
pub mod notifier;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
pub use mail::MailNotifier;
pub use notifier::{EventBusNotifier, FanoutNotifier, LoggingNotifier};

//! Broadcast bus for booking events.
//!
//! Publishing never blocks and never fails: with no subscribers the event
//! is dropped, and a subscriber that falls more than the channel capacity
//! behind skips ahead and logs how many events it lost.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::broadcast;

use super::events::{Event, EventMessage};

const DEFAULT_CAPACITY: usize = 1024;

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: Event) -> usize {
        let message = EventMessage::new(event);
        let kind = message.event.event_type();
        let reservation = message.event.reservation_id();

        let delivered = self.sender.send(message).unwrap_or(0);
        debug!(
            "booking event {} (reservation {:?}) delivered to {} subscriber(s)",
            kind, reservation, delivered
        );
        delivered
    }

    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
}

impl EventSubscriber {
    /// Next event, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("booking event subscriber lagged, skipped {} event(s)", missed);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

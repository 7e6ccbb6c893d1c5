//! Event bus - pub/sub channel for scheduler activity
//!
//! Built on a tokio broadcast channel: emitters fire and forget, any number
//! of consumers subscribe. Replaces the last-write-wins key/value broadcast
//! the original design polled on an interval.

use tokio::sync::broadcast;
use tracing::debug;

use super::types::Event;

/// Default channel capacity (events)
///
/// Far more than a full day's quota at the maximum setting; subscribers
/// that lag behind this drop the oldest events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Central event bus for scheduler activity
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// Fire-and-forget: with no subscribers the event is dropped.
    pub fn emit(&self, event: Event) {
        debug!(event_type = event.event_type(), word_id = ?event.word_id(), "EventBus::emit");
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

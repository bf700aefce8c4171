//! In-process Event Bus
//!
//! Protocol parsers publish [`ParsedEvent`]s here; listeners such as the
//! metrics exporter subscribe and receive every event published after they
//! subscribed, in publish order.
//!
//! The bus is a `tokio::sync::broadcast` channel. A listener that falls more
//! than `capacity` events behind loses the oldest ones and is told how many it
//! missed.

use crate::event::ParsedEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 1024;

/// Broadcast bus for parsed device events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Arc<ParsedEvent>>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per listener.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event, returning how many listeners it reached
    pub fn publish(&self, event: ParsedEvent) -> usize {
        match self.sender.send(Arc::new(event)) {
            Ok(listeners) => listeners,
            Err(_) => {
                debug!("Dropped event: no listeners registered");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ParsedEvent>> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

//! Best-effort broadcast for the WebSocket chat and catalog change events.
//!
//! Independent of the product store: publishing never waits on a catalog
//! cycle, and a slow subscriber only loses its own backlog.

use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<String>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends `message` to every current subscriber. Returns how many received it.
    pub fn publish(&self, message: impl Into<String>) -> usize {
        match self.sender.send(message.into()) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("notification dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

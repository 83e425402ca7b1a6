//! Event Bus - content blocker notifications

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockerEvent {
    /// A converted rule set was installed
    Updated { rules_count: usize, rules_over_limit: bool },
    /// The empty rule set was installed
    Cleared,
}

/// Simple event bus using tokio broadcast channel
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BlockerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn publish(&self, event: BlockerEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BlockerEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//! Event Bus - lifecycle notifications from the collapser
//!
//! Design: enums, not trait objects. Publishing is fire-and-forget; nobody
//! listening is the normal case.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Where a rule lives: the document sheet or a shadow root's sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleScope {
    Document,
    ShadowRoot,
}

impl StyleScope {
    pub fn of<N>(context: Option<N>) -> Self {
        match context {
            Some(_) => StyleScope::ShadowRoot,
            None => StyleScope::Document,
        }
    }
}

/// Suppression events that can be dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuppressionEvent {
    StyleSheetCreated { scope: StyleScope },
    StyleSheetRemoved { scope: StyleScope },
    RuleInserted { scope: StyleScope, rule: String },
    RulesRemoved { scope: StyleScope, selector: String, count: usize },
    ElementHidden { selector: String },
    ElementUnhidden { selector: String },
    ElementCollapsed { selector: Option<String> },
}

/// Simple event bus using tokio broadcast channel
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SuppressionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: SuppressionEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<SuppressionEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

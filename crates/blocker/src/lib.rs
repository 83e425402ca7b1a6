//! Content blocker controller
//!
//! Turns the enabled filter rules plus the whitelist into a platform
//! content-blocker rule set, debounced so a burst of changes converts once.
//! Rule storage, conversion and the platform API are collaborators behind
//! traits (`provider`).

pub mod config;
pub mod error;
pub mod events;
pub mod provider;
pub mod updater;
pub mod whitelist;

pub use config::BlockerConfig;
pub use error::{BlockerError, Result};
pub use events::{BlockerEvent, EventBus};
pub use provider::{ContentBlockerSink, Conversion, FilterSettings, RuleConverter, RuleSource, WhitelistService};
pub use updater::{Collaborators, ContentBlocker, UpdateOutcome};
pub use whitelist::inverted_whitelist_rule;

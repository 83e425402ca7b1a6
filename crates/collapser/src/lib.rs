//! Element collapser - hide page elements with injected style rules
//!
//! Give it an element (optionally inside a shadow root) and it computes a
//! structural selector for it, injects `selector { display:none!important }`
//! into a managed `<style>` sheet, and remembers the pairing so the rule can
//! be migrated or removed later.
//!
//! ## Philosophy (Linus Torvalds Style)
//!
//! - **Data structures first**: one record per element, one sheet per context
//! - **No special cases**: the document is just the context without a root
//! - **Recompute, don't cache**: paths are derived from the live tree every time
//!
//! ## Core Design
//!
//! ```text
//! hide/unhide/collapse
//!        ↓
//! PathResolver ──selector──→ RuleStore ──→ <style id=element-collapser-styles>
//!        ↓                       ↓
//!   HiddenSet (element → selector)   cleanup task (delay + re-check)
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod hidden;
pub mod host;
pub mod path;
pub mod rules;
pub mod strategy;
pub mod suppressor;

pub use config::SuppressorConfig;
pub use error::{CollapseError, Result};
pub use events::{EventBus, StyleScope, SuppressionEvent};
pub use hidden::{HiddenRecord, HiddenSet};
pub use host::StyleHost;
pub use path::resolve_path;
pub use rules::{CleanupTicket, RuleStore};
pub use suppressor::{BatchReport, ElementSuppressor};

//! Live DOM for the element collapser
//!
//! Arena-backed, mutable DOM tree with shadow roots, `<style>` sheets and a
//! small selector engine. It is the document the collapser hides elements in.
//!
//! ## Philosophy (Linus Torvalds Style)
//!
//! - **Good taste**: Data structures first, algorithms follow naturally
//! - **No special cases**: shadow roots are ordinary nodes with a host link
//! - **Cache friendly**: Arena allocation, sequential access patterns
//!
//! ## Core Design
//!
//! ```text
//! CDP JSON ──snapshot──→ DomArena (owned) ←── mutations (append/insert/remove)
//!                           ↓
//!                     NodeId (u32, never reused)
//!                           ↓
//!           <style> sheets → SelectorList → cascade (utils)
//! ```

#![recursion_limit = "256"]

pub mod arena;
pub mod error;
pub mod selector;
pub mod serializer;
pub mod snapshot;
pub mod stylesheet;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use selector::SelectorList;
pub use serializer::DomSerializer;
pub use snapshot::{parse_cdp_document, parse_cdp_document_str};
pub use stylesheet::{CssRule, Declaration, InlineStyle, StyleSheet};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_node_creation() {
        let mut arena = DomArena::new();
        let doc = arena.create_document();
        let html = arena.create_element("html");
        tokio_test::assert_ok!(arena.append_child(doc, html));
        tokio_test::assert_err!(arena.append_child(html, doc));
    }
}

//! PathResolver - structural selector for a node
//!
//! ```text
//! <html><body><div/><div><span/></div></body></html>
//!                        ↓
//!        body > div:nth-of-type(2) > span
//! ```
//!
//! The path is a snapshot of the tree at call time. Any mutation can change
//! it, so callers recompute instead of caching.

use crate::host::StyleHost;

/// Selector path from the tree root down to `node`
///
/// One segment per node that has a parent. The tree root (document or
/// shadow root) contributes nothing, a leading `html` segment is dropped,
/// and a detached parentless node yields the empty string.
pub fn resolve_path<H: StyleHost>(host: &H, node: H::Node) -> String {
    let mut segments = Vec::new();
    let mut current = node;

    while let Some(parent) = host.parent(current) {
        let name = host.node_name(current).unwrap_or_default();

        let mut count = 0;
        let mut position = 0;
        for sibling in host.child_nodes(parent) {
            if host.node_name(sibling) == Some(name) {
                count += 1;
                if sibling == current {
                    position = count;
                }
            }
        }

        let segment = escape_name(&name.to_ascii_lowercase());
        if count > 1 {
            segments.push(format!("{}:nth-of-type({})", segment, position));
        } else {
            segments.push(segment);
        }
        current = parent;
    }

    segments.reverse();
    if segments.first().map(String::as_str) == Some("html") {
        segments.remove(0);
    }
    segments.join(" > ")
}

/// Backslash-escape every character outside `[a-zA-Z0-9]`
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

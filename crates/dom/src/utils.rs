//! Utility functions for DOM processing
//!
//! A deliberately small cascade: enough to answer "is this element hidden?"
//! without a full style engine. Origins, specificity and inheritance are
//! ignored; later rules win over earlier ones, `!important` wins over normal.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{DomNode, NodeId, NodeType};

/// Effective value of `property` on `node` from inline style and the sheets
/// of the node's own tree (document or shadow root)
pub fn cascaded_value(arena: &DomArena, node_id: NodeId, property: &str) -> Option<String> {
    cascade(arena, node_id, property).ok().flatten()
}

fn cascade(arena: &DomArena, node_id: NodeId, property: &str) -> Result<Option<String>> {
    let node = arena.get(node_id)?;
    if !node.is_element() {
        return Ok(None);
    }

    let inline = node.inline_style.get(property);
    if let Some(decl) = inline.filter(|d| d.important) {
        return Ok(Some(decl.value.clone()));
    }

    let root = arena.tree_root(node_id)?;
    let scope = arena.get(root)?.is_shadow_root().then_some(root);

    let mut normal = None;
    let mut important = None;
    for sheet_id in arena.style_sheets(root) {
        for rule in arena.sheet(sheet_id)?.rules() {
            if !rule.selectors.matches(arena, node_id, scope) {
                continue;
            }
            for decl in rule.declarations.iter().filter(|d| d.property == property) {
                if decl.important {
                    important = Some(decl.value.clone());
                } else {
                    normal = Some(decl.value.clone());
                }
            }
        }
    }

    Ok(important
        .or_else(|| inline.map(|d| d.value.clone()))
        .or(normal))
}

/// Check if element is visible according to its own display/visibility
pub fn is_element_visible_by_css(arena: &DomArena, node_id: NodeId) -> bool {
    let display = cascaded_value(arena, node_id, "display").unwrap_or_default();
    let visibility = cascaded_value(arena, node_id, "visibility").unwrap_or_default();

    display != "none" && visibility != "hidden"
}

/// Check if the element would be rendered: visible itself, and no ancestor
/// (crossing shadow boundaries through the host) has `display: none`
pub fn is_rendered(arena: &DomArena, node_id: NodeId) -> bool {
    if !arena.is_connected(node_id) || !is_element_visible_by_css(arena, node_id) {
        return false;
    }

    let mut current = arena.get(node_id).ok().and_then(next_up);
    while let Some(id) = current {
        let Ok(node) = arena.get(id) else {
            return false;
        };
        if node.is_element() && cascaded_value(arena, id, "display").as_deref() == Some("none") {
            return false;
        }
        current = next_up(node);
    }
    true
}

fn next_up(node: &DomNode) -> Option<NodeId> {
    node.parent_id.or(node.host_id)
}

/// Get all text content from node and its children
pub fn get_text_content(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut text = String::new();

    arena.traverse_df(node_id, |node| {
        if node.node_type == NodeType::Text {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShadowRootType;

    fn page_with_style() -> (DomArena, NodeId, NodeId) {
        let mut arena = DomArena::new();
        let doc = arena.create_document();
        let html = arena.create_element("html");
        let head = arena.create_element("head");
        let body = arena.create_element("body");
        let style = arena.create_element("style");
        arena.append_child(doc, html).unwrap();
        arena.append_child(html, head).unwrap();
        arena.append_child(html, body).unwrap();
        arena.append_child(head, style).unwrap();
        (arena, body, style)
    }

    #[test]
    fn test_sheet_rule_hides_element() {
        let (mut arena, body, style) = page_with_style();
        let div = arena.create_element("div");
        arena.append_child(body, div).unwrap();
        assert!(is_rendered(&arena, div));

        arena
            .sheet_mut(style)
            .unwrap()
            .insert_rule("body > div{display:none!important;}", 0)
            .unwrap();
        assert!(!is_element_visible_by_css(&arena, div));
        assert!(!is_rendered(&arena, div));
    }

    #[test]
    fn test_important_beats_inline_normal() {
        let (mut arena, body, style) = page_with_style();
        let div = arena.create_element("div");
        arena.append_child(body, div).unwrap();
        arena.style_mut(div).unwrap().set_property("display", "block", false);

        arena.sheet_mut(style).unwrap().insert_rule("div{display:none}", 0).unwrap();
        assert_eq!(cascaded_value(&arena, div, "display").as_deref(), Some("block"));

        arena.sheet_mut(style).unwrap().insert_rule("div{display:none!important}", 1).unwrap();
        assert_eq!(cascaded_value(&arena, div, "display").as_deref(), Some("none"));

        arena.style_mut(div).unwrap().set_property("display", "flex", true);
        assert_eq!(cascaded_value(&arena, div, "display").as_deref(), Some("flex"));
    }

    #[test]
    fn test_hidden_ancestor_and_shadow_host() {
        let (mut arena, body, _) = page_with_style();
        let host = arena.create_element("section");
        arena.append_child(body, host).unwrap();
        let shadow = arena.attach_shadow(host, ShadowRootType::Open).unwrap();
        let inner = arena.create_element("span");
        arena.append_child(shadow, inner).unwrap();
        assert!(is_rendered(&arena, inner));

        arena.style_mut(host).unwrap().set_property("display", "none", true);
        assert!(!is_rendered(&arena, inner));
    }

    #[test]
    fn test_document_sheet_does_not_reach_into_shadow_tree() {
        let (mut arena, body, style) = page_with_style();
        let host = arena.create_element("div");
        arena.append_child(body, host).unwrap();
        let shadow = arena.attach_shadow(host, ShadowRootType::Open).unwrap();
        let inner = arena.create_element("span");
        arena.append_child(shadow, inner).unwrap();

        arena.sheet_mut(style).unwrap().insert_rule("span{display:none}", 0).unwrap();
        assert!(is_element_visible_by_css(&arena, inner));
    }

    #[test]
    fn test_get_text_content() {
        let (mut arena, body, _) = page_with_style();
        let p = arena.create_element("p");
        let t = arena.create_text("  hello ");
        arena.append_child(body, p).unwrap();
        arena.append_child(p, t).unwrap();
        assert_eq!(get_text_content(&arena, body).unwrap(), "hello");
    }
}

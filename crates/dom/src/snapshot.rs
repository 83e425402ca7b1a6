//! CDP snapshot import
//!
//! Builds a live `DomArena` from a `DOM.getDocument` response so a captured
//! page can be replayed against the collapser. Handles:
//! - flat `attributes` arrays (`[name, value, name, value, ...]`)
//! - `shadowRoots` (attached as shadow trees, not children)
//! - inline `style` attributes (parsed into the inline declaration block)
//!
//! Input format:
//! ```json
//! {
//!   "root": {
//!     "nodeId": 1,
//!     "backendNodeId": 1,
//!     "nodeType": 9,
//!     "nodeName": "#document",
//!     "children": [...]
//!   }
//! }
//! ```

use serde_json::Value;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::stylesheet::InlineStyle;
use crate::types::{DomNode, NodeId, NodeType, ShadowRootType};

/// Parse a CDP document response into a fresh arena
pub fn parse_cdp_document(cdp_response: &Value) -> Result<DomArena> {
    let root = cdp_response
        .get("root")
        .ok_or_else(|| DomError::CdpError("Missing 'root' in CDP response".to_string()))?;

    let mut arena = DomArena::new();
    let root_id = parse_node(&mut arena, root)?;
    arena.set_root(root_id)?;
    Ok(arena)
}

/// Parse a CDP document from its JSON text
pub fn parse_cdp_document_str(json: &str) -> Result<DomArena> {
    let value: Value = serde_json::from_str(json)?;
    parse_cdp_document(&value)
}

/// Recursively parse a CDP node, returns the arena ID
fn parse_node(arena: &mut DomArena, cdp_node: &Value) -> Result<NodeId> {
    let backend_node_id = cdp_node["backendNodeId"]
        .as_u64()
        .ok_or_else(|| DomError::CdpError("Missing backendNodeId".to_string()))?
        as u32;

    let node_type_val = cdp_node["nodeType"]
        .as_u64()
        .ok_or_else(|| DomError::CdpError("Missing nodeType".to_string()))? as u8;

    let node_type = NodeType::from_u8(node_type_val).ok_or_else(|| DomError::InvalidNodeType {
        expected: "valid NodeType".to_string(),
        actual: format!("{}", node_type_val),
    })?;

    let node_name = cdp_node["nodeName"].as_str().unwrap_or("").to_string();

    let mut node = DomNode::new(0, node_type, node_name);
    node.backend_node_id = Some(backend_node_id);
    node.node_value = cdp_node["nodeValue"].as_str().unwrap_or("").to_string();

    if let Some(attrs) = cdp_node["attributes"].as_array() {
        for pair in attrs.chunks_exact(2) {
            if let (Some(key), Some(value)) = (pair[0].as_str(), pair[1].as_str()) {
                node.attributes.insert(key.to_ascii_lowercase(), value.to_string());
            }
        }
    }
    if let Some(style) = node.attributes.get("style") {
        node.inline_style = InlineStyle::parse(style);
    }

    if let Some(shadow_type) = cdp_node.get("shadowRootType").and_then(|v| v.as_str()) {
        node.shadow_root_type = ShadowRootType::parse(shadow_type);
    }

    let current_node_id = arena.add_node(node);

    if let Some(children) = cdp_node["children"].as_array() {
        for child in children {
            let child_id = parse_node(arena, child)?;
            arena.append_child(current_node_id, child_id)?;
        }
    }

    if let Some(shadow_roots) = cdp_node["shadowRoots"].as_array() {
        for shadow in shadow_roots {
            let shadow_id = parse_node(arena, shadow)?;
            let shadow_node = arena.get_mut(shadow_id)?;
            if shadow_node.node_type != NodeType::DocumentFragment {
                return Err(DomError::InvalidNodeType {
                    expected: "#document-fragment".to_string(),
                    actual: shadow_node.node_name.clone(),
                });
            }
            shadow_node.host_id = Some(current_node_id);
            arena
                .get_mut(current_node_id)?
                .shadow_root_ids
                .get_or_insert_with(Default::default)
                .push(shadow_id);
        }
    }

    Ok(current_node_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_dom() {
        let cdp_json = serde_json::json!({
            "root": {
                "nodeId": 1,
                "backendNodeId": 1,
                "nodeType": 9,
                "nodeName": "#document",
                "nodeValue": "",
                "children": [{
                    "nodeId": 2,
                    "backendNodeId": 2,
                    "nodeType": 1,
                    "nodeName": "HTML",
                    "nodeValue": "",
                    "attributes": []
                }]
            }
        });

        let arena = parse_cdp_document(&cdp_json).unwrap();

        assert_eq!(arena.root_id(), Some(0));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get_by_backend_id(2).unwrap().node_name, "html");
    }

    #[test]
    fn test_parse_attributes_and_shadow_root() {
        let cdp_json = serde_json::json!({
            "root": {
                "nodeId": 1, "backendNodeId": 1, "nodeType": 9, "nodeName": "#document",
                "children": [{
                    "nodeId": 2, "backendNodeId": 2, "nodeType": 1, "nodeName": "HTML",
                    "children": [{
                        "nodeId": 3, "backendNodeId": 3, "nodeType": 1, "nodeName": "BODY",
                        "children": [{
                            "nodeId": 4, "backendNodeId": 4, "nodeType": 1, "nodeName": "X-WIDGET",
                            "attributes": ["id", "w", "style", "display: block"],
                            "shadowRoots": [{
                                "nodeId": 5, "backendNodeId": 5, "nodeType": 11,
                                "nodeName": "#document-fragment", "shadowRootType": "open",
                                "children": [{
                                    "nodeId": 6, "backendNodeId": 6, "nodeType": 1, "nodeName": "IMG",
                                    "attributes": ["src", "ad.png"]
                                }]
                            }]
                        }]
                    }]
                }]
            }
        });

        let arena = parse_cdp_document(&cdp_json).unwrap();
        let widget = arena.get_node_id_by_backend(4).unwrap();
        let shadow = arena.get_node_id_by_backend(5).unwrap();
        let img = arena.get_node_id_by_backend(6).unwrap();

        assert_eq!(arena.get(widget).unwrap().attr("id"), Some("w"));
        assert_eq!(arena.style(widget).unwrap().get_property_value("display"), "block");
        assert_eq!(arena.shadow_root(widget), Some(shadow));
        assert!(arena.get(widget).unwrap().children_ids.is_empty());
        assert_eq!(arena.tree_root(img).unwrap(), shadow);
        assert!(arena.is_connected(img));
        assert_eq!(
            arena.get(shadow).unwrap().shadow_root_type,
            Some(ShadowRootType::Open)
        );
    }

    #[test]
    fn test_missing_root_is_cdp_error() {
        let err = parse_cdp_document(&serde_json::json!({})).unwrap_err();
        assert!(matches!(err, DomError::CdpError(_)));

        let err = parse_cdp_document_str("{not json").unwrap_err();
        assert!(matches!(err, DomError::ParseError(_)));
    }
}

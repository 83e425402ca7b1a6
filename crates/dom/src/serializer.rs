//! DOM Serializer - dump a live tree as indented markup
//!
//! Used for diagnostics: shows shadow trees (as `<#shadow-root>`), inline
//! styles, and the live rule list of `<style>` sheets, which is where the
//! collapser's work actually lands.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    pub include_shadow_roots: bool,
    pub include_style_rules: bool,
    pub max_text_length: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            include_shadow_roots: true,
            include_style_rules: true,
            max_text_length: 200,
        }
    }
}

/// DOM Tree Serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize the whole document
    pub fn serialize(&self, arena: &DomArena) -> Result<String> {
        let mut output = String::with_capacity(4096);

        if let Some(root_id) = arena.root_id() {
            self.serialize_node(arena, root_id, 0, &mut output)?;
        }

        Ok(output)
    }

    /// Serialize a subtree
    pub fn serialize_subtree(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::new();
        self.serialize_node(arena, node_id, 0, &mut output)?;
        Ok(output)
    }

    /// Serialize a single node recursively
    fn serialize_node(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        depth: usize,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;
        let indent = "  ".repeat(depth);

        match node.node_type {
            NodeType::Element => {
                output.push_str(&indent);
                output.push('<');
                output.push_str(&node.node_name);

                // Sorted for stable output
                let mut attrs: Vec<_> = node
                    .attributes
                    .iter()
                    .filter(|(name, _)| name.as_str() != "style")
                    .collect();
                attrs.sort();
                for (name, value) in attrs {
                    output.push_str(&format!(" {}=\"{}\"", name, value.replace('"', "&quot;")));
                }
                if !node.inline_style.is_empty() {
                    output.push_str(&format!(" style=\"{}\"", node.inline_style.css_text()));
                }
                output.push_str(">\n");

                if self.config.include_shadow_roots {
                    for &shadow_id in node.shadow_root_ids.iter().flatten() {
                        self.serialize_node(arena, shadow_id, depth + 1, output)?;
                    }
                }

                if self.config.include_style_rules {
                    if let Some(sheet) = &node.sheet {
                        for rule in sheet.rules() {
                            output.push_str(&indent);
                            output.push_str("  ");
                            output.push_str(&rule.css_text());
                            output.push('\n');
                        }
                    }
                }

                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth + 1, output)?;
                }

                output.push_str(&indent);
                output.push_str("</");
                output.push_str(&node.node_name);
                output.push_str(">\n");
            }
            NodeType::Text => {
                let text = node.node_value.trim();
                if !text.is_empty() {
                    output.push_str(&indent);
                    output.push_str(&cap_text_length(text, self.config.max_text_length));
                    output.push('\n');
                }
            }
            NodeType::DocumentFragment => {
                output.push_str(&indent);
                output.push_str("<#shadow-root>\n");
                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth + 1, output)?;
                }
                output.push_str(&indent);
                output.push_str("</#shadow-root>\n");
            }
            NodeType::Document => {
                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth, output)?;
                }
            }
            _ => {
                // Comments, doctypes: not interesting here
            }
        }

        Ok(())
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cap text length to keep dumps readable
pub fn cap_text_length(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::parse_cdp_document;

    #[test]
    fn test_cap_text_length() {
        assert_eq!(cap_text_length("hello", 10), "hello");
        assert_eq!(cap_text_length("hello world", 5), "hello...");
        assert_eq!(cap_text_length("héllo", 2), "hé...");
    }

    #[test]
    fn test_serialize_simple_dom() {
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
                    "attributes": ["lang", "en"],
                    "children": [{
                        "nodeId": 3,
                        "backendNodeId": 3,
                        "nodeType": 3,
                        "nodeName": "#text",
                        "nodeValue": "Hello",
                        "attributes": []
                    }]
                }]
            }
        });

        let arena = parse_cdp_document(&cdp_json).unwrap();
        let output = DomSerializer::new().serialize(&arena).unwrap();

        assert_eq!(output, "<html lang=\"en\">\n  Hello\n</html>\n");
    }

    #[test]
    fn test_serialize_style_rules_and_shadow_root() {
        let mut arena = DomArena::new();
        let doc = arena.create_document();
        let html = arena.create_element("html");
        let style = arena.create_element("style");
        let host = arena.create_element("div");
        arena.append_child(doc, html).unwrap();
        arena.append_child(html, style).unwrap();
        arena.append_child(html, host).unwrap();
        arena.attach_shadow(host, ShadowRootType::Open).unwrap();
        arena.sheet_mut(style).unwrap().insert_rule("div{display:none!important;}", 0).unwrap();

        let output = DomSerializer::new().serialize(&arena).unwrap();
        assert!(output.contains("div { display: none !important; }"), "got: {}", output);
        assert!(output.contains("<#shadow-root>"), "got: {}", output);
    }
}

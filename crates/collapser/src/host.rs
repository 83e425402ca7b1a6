//! StyleHost - what the collapser needs from a document
//!
//! The collapser never touches a concrete DOM. It asks a `StyleHost` to walk
//! the tree, read attributes, poke inline styles, and manage the one
//! `<style>` container per context. `DomArena` is the in-tree host.

use std::fmt::Debug;
use std::hash::Hash;

use dom::{DomArena, DomError, NodeId};

/// Document capabilities used by the collapser
///
/// `context` arguments are `None` for the document, `Some(shadow_root)`
/// for a shadow tree.
pub trait StyleHost {
    /// Node identity; copying it must not keep the node alive
    type Node: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn child_nodes(&self, node: Self::Node) -> Vec<Self::Node>;
    /// `nodeName`: lower-cased tag for elements, `#text` etc. otherwise
    fn node_name(&self, node: Self::Node) -> Option<&str>;
    /// Lower-cased tag name, `None` for non-elements
    fn tag_name(&self, node: Self::Node) -> Option<&str>;
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
    fn is_connected(&self, node: Self::Node) -> bool;

    /// Inline `(value, important)` for `property`, if set
    fn inline_style(&self, node: Self::Node, property: &str) -> Option<(&str, bool)>;
    fn set_inline_style(
        &mut self,
        node: Self::Node,
        property: &str,
        value: &str,
        important: bool,
    ) -> Result<(), DomError>;

    fn find_style_container(&self, context: Option<Self::Node>, id: &str) -> Option<Self::Node>;
    fn create_style_container(
        &mut self,
        context: Option<Self::Node>,
        id: &str,
    ) -> Result<Self::Node, DomError>;
    fn rule_count(&self, container: Self::Node) -> usize;
    fn rule_selector(&self, container: Self::Node, index: usize) -> Option<&str>;
    fn insert_rule(&mut self, container: Self::Node, rule: &str, index: usize) -> Result<usize, DomError>;
    fn delete_rule(&mut self, container: Self::Node, index: usize) -> Result<(), DomError>;
    /// Remove the container from its tree
    fn detach(&mut self, container: Self::Node) -> Result<(), DomError>;
    fn is_attached(&self, container: Self::Node) -> bool;
}

impl StyleHost for DomArena {
    type Node = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).ok()?.parent_id
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node)
            .map(|n| n.children_ids.to_vec())
            .unwrap_or_default()
    }

    fn node_name(&self, node: NodeId) -> Option<&str> {
        self.get(node).ok().map(|n| n.node_name.as_str())
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.get(node).ok()?.tag_name()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).ok()?.attr(name)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        DomArena::is_connected(self, node)
    }

    fn inline_style(&self, node: NodeId, property: &str) -> Option<(&str, bool)> {
        let decl = self.style(node).ok()?.get(property)?;
        Some((decl.value.as_str(), decl.important))
    }

    fn set_inline_style(
        &mut self,
        node: NodeId,
        property: &str,
        value: &str,
        important: bool,
    ) -> Result<(), DomError> {
        self.style_mut(node)?.set_property(property, value, important);
        Ok(())
    }

    fn find_style_container(&self, context: Option<NodeId>, id: &str) -> Option<NodeId> {
        let scope = context.or(self.root_id())?;
        self.get_element_by_id(scope, id)
            .filter(|&found| self.sheet(found).is_ok())
    }

    fn create_style_container(&mut self, context: Option<NodeId>, id: &str) -> Result<NodeId, DomError> {
        let parent = match context {
            Some(shadow_root) => shadow_root,
            None => self
                .head()
                .or_else(|| self.document_element())
                .ok_or_else(|| {
                    DomError::HierarchyRequest("document has no element to hold a style sheet".to_string())
                })?,
        };

        let style = self.create_element("style");
        self.set_attribute(style, "id", id)?;
        self.set_attribute(style, "type", "text/css")?;
        self.append_child(parent, style)?;
        Ok(style)
    }

    fn rule_count(&self, container: NodeId) -> usize {
        self.sheet(container).map(|s| s.len()).unwrap_or(0)
    }

    fn rule_selector(&self, container: NodeId, index: usize) -> Option<&str> {
        let rule = self.sheet(container).ok()?.rules().get(index)?;
        Some(rule.selector_text.as_str())
    }

    fn insert_rule(&mut self, container: NodeId, rule: &str, index: usize) -> Result<usize, DomError> {
        self.sheet_mut(container)?.insert_rule(rule, index)
    }

    fn delete_rule(&mut self, container: NodeId, index: usize) -> Result<(), DomError> {
        self.sheet_mut(container)?.delete_rule(index)
    }

    fn detach(&mut self, container: NodeId) -> Result<(), DomError> {
        DomArena::detach(self, container)
    }

    fn is_attached(&self, container: NodeId) -> bool {
        StyleHost::parent(self, container).is_some()
    }
}

//! Arena-based DOM tree storage
//!
//! ## Linus Philosophy Applied
//!
//! "Bad programmers worry about the code. Good programmers worry about
//! data structures and their relationships."
//!
//! This arena eliminates:
//! - Rc/Arc overhead (16 bytes per pointer)
//! - Dangling handles: node ids are never reused, a removed node simply
//!   stays in the arena detached from any tree
//! - Cache misses (nodes stored sequentially)
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::selector::SelectorList;
use crate::stylesheet::{InlineStyle, StyleSheet};
use crate::types::{DomNode, NodeId, NodeType, ShadowRootType};
use ahash::AHashMap;

/// Arena allocator for DOM nodes
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for backend_node_id → NodeId lookup (CDP snapshots use backend IDs)
/// - No Rc/Arc: use indices everywhere
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Backend node ID → NodeId lookup (for CDP integration)
    backend_id_map: AHashMap<u32, NodeId>,

    /// Document node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(1024), // Pre-allocate for typical page
            backend_id_map: AHashMap::with_capacity(1024),
            root_id: None,
        }
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            backend_id_map: AHashMap::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its ID
    ///
    /// The node's own `node_id` is overwritten with its arena slot.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        if let Some(backend_id) = node.backend_node_id {
            self.backend_id_map.insert(backend_id, node_id);
        }
        self.nodes.push(node);
        node_id
    }

    /// Create the document node; the first one becomes the arena root
    pub fn create_document(&mut self) -> NodeId {
        let id = self.add_node(DomNode::new(0, NodeType::Document, "#document".to_string()));
        if self.root_id.is_none() {
            self.root_id = Some(id);
        }
        id
    }

    /// Create a detached element (tag name is lower-cased)
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.add_node(DomNode::new(0, NodeType::Element, tag.to_string()))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Text, "#text".to_string());
        node.node_value = text.to_string();
        self.add_node(node)
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Comment, "#comment".to_string());
        node.node_value = text.to_string();
        self.add_node(node)
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by backend node ID (from CDP)
    pub fn get_by_backend_id(&self, backend_id: u32) -> Result<&DomNode> {
        let node_id = self
            .backend_id_map
            .get(&backend_id)
            .ok_or(DomError::NodeNotFound(backend_id))?;
        self.get(*node_id)
    }

    /// Get node ID by backend node ID
    pub fn get_node_id_by_backend(&self, backend_id: u32) -> Option<NodeId> {
        self.backend_id_map.get(&backend_id).copied()
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Get root node
    pub fn root(&self) -> Result<&DomNode> {
        let root_id = self
            .root_id
            .ok_or_else(|| DomError::HierarchyRequest("No document node set".to_string()))?;
        self.get(root_id)
    }

    /// Set (or replace) an attribute
    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.element_mut(node_id)?;
        let name = name.to_ascii_lowercase();
        if name == "style" {
            node.inline_style = InlineStyle::parse(value);
        }
        node.attributes.insert(name, value.to_string());
        Ok(())
    }

    /// Remove an attribute, returns the old value
    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        let node = self.element_mut(node_id)?;
        Ok(node.attributes.remove(&name.to_ascii_lowercase()))
    }

    /// Inline style of an element
    pub fn style(&self, node_id: NodeId) -> Result<&InlineStyle> {
        let node = self.get(node_id)?;
        if !node.is_element() {
            return Err(not_an_element(node));
        }
        Ok(&node.inline_style)
    }

    /// Mutable inline style of an element
    pub fn style_mut(&mut self, node_id: NodeId) -> Result<&mut InlineStyle> {
        Ok(&mut self.element_mut(node_id)?.inline_style)
    }

    /// Sheet of a `<style>` element
    pub fn sheet(&self, node_id: NodeId) -> Result<&StyleSheet> {
        let node = self.get(node_id)?;
        node.sheet.as_ref().ok_or_else(|| DomError::InvalidNodeType {
            expected: "style element".to_string(),
            actual: node.node_name.clone(),
        })
    }

    /// Mutable sheet of a `<style>` element
    pub fn sheet_mut(&mut self, node_id: NodeId) -> Result<&mut StyleSheet> {
        let node = self.get_mut(node_id)?;
        let actual = node.node_name.clone();
        node.sheet.as_mut().ok_or(DomError::InvalidNodeType {
            expected: "style element".to_string(),
            actual,
        })
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.check_insertion(parent, child)?;
        if let Some(reference) = reference {
            if self.get(reference)?.parent_id != Some(parent) {
                return Err(DomError::HierarchyRequest(format!(
                    "reference node {} is not a child of {}",
                    reference, parent
                )));
            }
        }

        self.detach(child)?;

        let parent_node = self.get_mut(parent)?;
        let index = reference
            .and_then(|r| parent_node.children_ids.iter().position(|&c| c == r))
            .unwrap_or(parent_node.children_ids.len());
        parent_node.children_ids.insert(index, child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(child)?.parent_id != Some(parent) {
            return Err(DomError::HierarchyRequest(format!(
                "node {} is not a child of {}",
                child, parent
            )));
        }
        self.detach(child)
    }

    /// Detach a node from its parent (no-op when already detached)
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let Some(parent) = self.get(node_id)?.parent_id else {
            return Ok(());
        };
        self.get_mut(parent)?.children_ids.retain(|c| *c != node_id);
        self.get_mut(node_id)?.parent_id = None;
        Ok(())
    }

    /// Attach a shadow root to `host`, returns the shadow root ID
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootType) -> Result<NodeId> {
        let host_node = self.element_mut(host)?;
        if host_node.shadow_root_ids.is_some() {
            return Err(DomError::HierarchyRequest(format!(
                "element {} already hosts a shadow root",
                host
            )));
        }

        let mut root = DomNode::new(0, NodeType::DocumentFragment, "#document-fragment".to_string());
        root.host_id = Some(host);
        root.shadow_root_type = Some(mode);
        let root_id = self.add_node(root);

        self.get_mut(host)?
            .shadow_root_ids
            .get_or_insert_with(Default::default)
            .push(root_id);
        Ok(root_id)
    }

    /// Shadow root hosted by `host`, if any
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.get(host)
            .ok()?
            .shadow_root_ids
            .as_ref()?
            .first()
            .copied()
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Iterator over all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Topmost ancestor reachable through parent links
    ///
    /// The document for attached nodes, the shadow root for nodes inside a
    /// shadow tree, the detached subtree's top node otherwise.
    pub fn tree_root(&self, node_id: NodeId) -> Result<NodeId> {
        let mut current = self.get(node_id)?;
        while let Some(parent_id) = current.parent_id {
            current = self.get(parent_id)?;
        }
        Ok(current.node_id)
    }

    /// Whether the node is in the document, directly or through shadow hosts
    pub fn is_connected(&self, node_id: NodeId) -> bool {
        let mut current = node_id;
        loop {
            let Ok(root_id) = self.tree_root(current) else {
                return false;
            };
            if Some(root_id) == self.root_id {
                return true;
            }
            match self.get(root_id).ok().and_then(|root| root.host_id) {
                Some(host) => current = host,
                None => return false,
            }
        }
    }

    /// `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        let root = self.root().ok()?;
        root.children_ids
            .iter()
            .copied()
            .find(|&id| self.get(id).map(|n| n.is_element()).unwrap_or(false))
    }

    /// `<head>` element
    pub fn head(&self) -> Option<NodeId> {
        self.document_child("head")
    }

    /// `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        self.document_child("body")
    }

    /// First element with `id` in the tree rooted at `scope` (tree order)
    pub fn get_element_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        let mut found = None;
        let _ = self.traverse_df(scope, |node| {
            if found.is_none() && node.is_element() && node.attr("id") == Some(id) {
                found = Some(node.node_id);
            }
            Ok(())
        });
        found
    }

    /// `<style>` elements of the tree rooted at `scope`, in tree order
    pub fn style_sheets(&self, scope: NodeId) -> Vec<NodeId> {
        let mut sheets = Vec::new();
        let _ = self.traverse_df(scope, |node| {
            if node.sheet.is_some() {
                sheets.push(node.node_id);
            }
            Ok(())
        });
        sheets
    }

    /// Descendant elements of `scope` matching `selector`, in tree order
    ///
    /// `scope` is usually the document or a shadow root; selectors carrying
    /// the `::content` marker only match when `scope` is a shadow root.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selectors = SelectorList::parse(selector)?;
        let shadow_scope = self.get(scope)?.is_shadow_root().then_some(scope);

        let mut matches = Vec::new();
        self.traverse_df(scope, |node| {
            if node.node_id != scope && selectors.matches(self, node.node_id, shadow_scope) {
                matches.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(matches)
    }

    /// Traverse tree depth-first (iterative, no recursion)
    ///
    /// This is the "good taste" version - no special cases for leaf nodes.
    /// Shadow trees are not entered: they are separate trees.
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Traverse tree breadth-first
    pub fn traverse_bf<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(start_id);

        while let Some(node_id) = queue.pop_front() {
            let node = self.get(node_id)?;
            visit(node)?;

            for &child_id in node.children_ids.iter() {
                queue.push_back(child_id);
            }
        }

        Ok(())
    }

    /// Find nodes matching predicate
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| {
                if predicate(node) {
                    Some(idx as NodeId)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Find first node matching predicate
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes.iter().enumerate().find_map(|(idx, node)| {
            if predicate(node) {
                Some(idx as NodeId)
            } else {
                None
            }
        })
    }

    /// Find all elements by tag name (attached or not)
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| node.node_type == NodeType::Element && node.node_name.eq_ignore_ascii_case(tag))
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.backend_id_map.clear();
        self.root_id = None;
    }

    fn document_child(&self, tag: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.get(html)
            .ok()?
            .children_ids
            .iter()
            .copied()
            .find(|&id| self.get(id).map(|n| n.node_name == tag).unwrap_or(false))
    }

    fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        let node = self.get_mut(node_id)?;
        if !node.is_element() {
            return Err(not_an_element(node));
        }
        Ok(node)
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.get(parent)?;
        let child_node = self.get(child)?;

        if !matches!(
            parent_node.node_type,
            NodeType::Element | NodeType::Document | NodeType::DocumentFragment
        ) {
            return Err(DomError::HierarchyRequest(format!(
                "{} cannot have children",
                parent_node.node_name
            )));
        }
        if child_node.node_type == NodeType::Document || child_node.is_shadow_root() {
            return Err(DomError::HierarchyRequest(format!(
                "{} cannot be inserted",
                child_node.node_name
            )));
        }

        // Inserting an inclusive ancestor would create a cycle; walk through
        // shadow hosts as well
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(DomError::HierarchyRequest(format!(
                    "node {} is an ancestor of {}",
                    child, parent
                )));
            }
            let node = self.get(id)?;
            current = node.parent_id.or(node.host_id);
        }
        Ok(())
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

fn not_an_element(node: &DomNode) -> DomError {
    DomError::InvalidNodeType {
        expected: "element".to_string(),
        actual: node.node_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (DomArena, NodeId, NodeId) {
        let mut arena = DomArena::new();
        let doc = arena.create_document();
        let html = arena.create_element("HTML");
        let head = arena.create_element("head");
        let body = arena.create_element("body");
        arena.append_child(doc, html).unwrap();
        arena.append_child(html, head).unwrap();
        arena.append_child(html, body).unwrap();
        (arena, doc, body)
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let id = arena.create_element("DIV");
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert_eq!(retrieved.tag_name(), Some("div"));
        assert!(matches!(arena.get(42), Err(DomError::NodeNotFound(42))));
    }

    #[test]
    fn test_document_accessors() {
        let (arena, doc, body) = page();
        assert_eq!(arena.root_id(), Some(doc));
        assert_eq!(arena.body(), Some(body));
        assert!(arena.head().is_some());
        assert_eq!(arena.get(arena.document_element().unwrap()).unwrap().node_name, "html");
    }

    #[test]
    fn test_insert_before_and_move() {
        let (mut arena, _, body) = page();
        let a = arena.create_element("a");
        let b = arena.create_element("b");
        arena.append_child(body, a).unwrap();
        arena.insert_before(body, b, Some(a)).unwrap();
        assert_eq!(arena.get(body).unwrap().children_ids.as_slice(), &[b, a]);

        // Re-appending moves the node instead of duplicating it
        arena.append_child(body, b).unwrap();
        assert_eq!(arena.get(body).unwrap().children_ids.as_slice(), &[a, b]);
    }

    #[test]
    fn test_remove_child_keeps_node_alive() {
        let (mut arena, _, body) = page();
        let div = arena.create_element("div");
        arena.append_child(body, div).unwrap();
        assert!(arena.is_connected(div));

        arena.remove_child(body, div).unwrap();
        assert!(!arena.is_connected(div));
        assert_eq!(arena.tree_root(div).unwrap(), div);
        assert!(arena.get(div).is_ok());
        assert!(matches!(arena.remove_child(body, div), Err(DomError::HierarchyRequest(_))));
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut arena, _, body) = page();
        let outer = arena.create_element("div");
        let inner = arena.create_element("div");
        arena.append_child(body, outer).unwrap();
        arena.append_child(outer, inner).unwrap();
        assert!(matches!(arena.append_child(inner, outer), Err(DomError::HierarchyRequest(_))));

        let text = arena.create_text("hi");
        assert!(matches!(arena.append_child(text, inner), Err(DomError::HierarchyRequest(_))));
    }

    #[test]
    fn test_shadow_root_connectivity() {
        let (mut arena, _, body) = page();
        let host = arena.create_element("x-host");
        arena.append_child(body, host).unwrap();
        let shadow = arena.attach_shadow(host, ShadowRootType::Open).unwrap();
        let inner = arena.create_element("span");
        arena.append_child(shadow, inner).unwrap();

        assert_eq!(arena.shadow_root(host), Some(shadow));
        assert_eq!(arena.tree_root(inner).unwrap(), shadow);
        assert!(arena.is_connected(inner));
        assert!(arena.attach_shadow(host, ShadowRootType::Open).is_err());

        arena.detach(host).unwrap();
        assert!(!arena.is_connected(inner));
    }

    #[test]
    fn test_get_element_by_id_is_scoped() {
        let (mut arena, doc, body) = page();
        let host = arena.create_element("div");
        arena.append_child(body, host).unwrap();
        let shadow = arena.attach_shadow(host, ShadowRootType::Open).unwrap();
        let inner = arena.create_element("p");
        arena.set_attribute(inner, "id", "target").unwrap();
        arena.append_child(shadow, inner).unwrap();

        assert_eq!(arena.get_element_by_id(doc, "target"), None);
        assert_eq!(arena.get_element_by_id(shadow, "target"), Some(inner));
    }

    #[test]
    fn test_query_selector_all_nth_of_type() {
        let (mut arena, doc, body) = page();
        let first = arena.create_element("div");
        let text = arena.create_text(" ");
        let span = arena.create_element("span");
        let second = arena.create_element("div");
        for node in [first, text, span, second] {
            arena.append_child(body, node).unwrap();
        }

        assert_eq!(
            arena.query_selector_all(doc, "body > div:nth-of-type(2)").unwrap(),
            vec![second]
        );
        assert_eq!(arena.query_selector_all(doc, "html div").unwrap(), vec![first, second]);
        assert!(arena.query_selector_all(doc, "div:").is_err());
    }

    #[test]
    fn test_scoped_selector_anchors_at_shadow_root() {
        let (mut arena, doc, body) = page();
        let host = arena.create_element("div");
        arena.append_child(body, host).unwrap();
        let shadow = arena.attach_shadow(host, ShadowRootType::Open).unwrap();

        let top = arena.create_element("div");
        let top_span = arena.create_element("span");
        let wrapper = arena.create_element("p");
        let nested = arena.create_element("div");
        let nested_span = arena.create_element("span");
        arena.append_child(shadow, top).unwrap();
        arena.append_child(top, top_span).unwrap();
        arena.append_child(shadow, wrapper).unwrap();
        arena.append_child(wrapper, nested).unwrap();
        arena.append_child(nested, nested_span).unwrap();

        assert_eq!(
            arena.query_selector_all(shadow, "::content div > span").unwrap(),
            vec![top_span]
        );
        assert_eq!(
            arena.query_selector_all(shadow, "div > span").unwrap(),
            vec![top_span, nested_span]
        );
        assert!(arena.query_selector_all(doc, "::content div").unwrap().is_empty());
    }

    #[test]
    fn test_style_element_owns_sheet() {
        let (mut arena, doc, _) = page();
        let head = arena.head().unwrap();
        let style = arena.create_element("style");
        arena.append_child(head, style).unwrap();

        arena.sheet_mut(style).unwrap().insert_rule("p{color:red}", 0).unwrap();
        assert_eq!(arena.style_sheets(doc), vec![style]);
        assert_eq!(arena.sheet(style).unwrap().len(), 1);
        assert!(arena.sheet(head).is_err());
    }

    #[test]
    fn test_traverse_df() {
        let (arena, doc, _) = page();
        let mut visited = Vec::new();
        arena
            .traverse_df(doc, |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["#document", "html", "head", "body"]);
    }
}

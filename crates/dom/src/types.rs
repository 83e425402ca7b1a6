//! Core type definitions for the live DOM
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Element names are stored lower-cased, the way an HTML document reports them

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::stylesheet::{InlineStyle, StyleSheet};

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Node type matching DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }
}

/// Shadow root type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowRootType {
    UserAgent,
    Open,
    Closed,
}

impl ShadowRootType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user-agent" => Some(ShadowRootType::UserAgent),
            "open" => Some(ShadowRootType::Open),
            "closed" => Some(ShadowRootType::Closed),
            _ => None,
        }
    }
}

/// The main DOM tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
/// - Shadow roots are ordinary nodes whose `host_id` points back at the host;
///   their `parent_id` stays `None` so upward walks stop at the shadow boundary
#[derive(Debug, Clone)]
pub struct DomNode {
    pub node_id: NodeId,
    pub backend_node_id: Option<u32>,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    pub node_name: String,
    pub node_value: String,
    pub attributes: HashMap<String, String>,

    // Shadow DOM
    pub shadow_root_type: Option<ShadowRootType>,
    pub shadow_root_ids: Option<SmallVec<[NodeId; 2]>>,
    pub host_id: Option<NodeId>,

    // Styling
    pub inline_style: InlineStyle,
    /// Present on `<style>` elements only
    pub sheet: Option<StyleSheet>,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: String) -> Self {
        let node_name = match node_type {
            NodeType::Element => node_name.to_ascii_lowercase(),
            _ => node_name,
        };
        let sheet = (node_type == NodeType::Element && node_name == "style")
            .then(StyleSheet::new);

        Self {
            node_id,
            backend_node_id: None,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            attributes: HashMap::new(),
            shadow_root_type: None,
            shadow_root_ids: None,
            host_id: None,
            inline_style: InlineStyle::default(),
            sheet,
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Check if node is a shadow root
    pub fn is_shadow_root(&self) -> bool {
        self.node_type == NodeType::DocumentFragment && self.host_id.is_some()
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }
}

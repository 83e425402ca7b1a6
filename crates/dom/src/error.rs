//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. Names follow the DOMException kinds a
//! browser would raise for the same misuse.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Index {index} is out of range for a list of length {len}")]
    IndexSize { index: usize, len: usize },

    #[error("CDP protocol error: {0}")]
    CdpError(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

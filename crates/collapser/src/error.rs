//! Collapser errors
//!
//! Flat on purpose: callers mostly care whether a suppression was dropped
//! (`MalformedSelector`) or the target was wrong.

use dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollapseError>;

#[derive(Debug, Error)]
pub enum CollapseError {
    /// The style sheet refused the rule; the suppression did not happen
    #[error("Malformed selector in rule {rule:?}: {source}")]
    MalformedSelector {
        rule: String,
        #[source]
        source: DomError,
    },

    #[error("Node {0} is not an element")]
    NotAnElement(String),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

//! Blocker errors

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlockerError>;

#[derive(Debug, Error)]
pub enum BlockerError {
    #[error("Content blocker sink error: {0}")]
    Sink(String),

    #[error("Failed to load empty blocker from {path:?}: {source}")]
    EmptyBlocker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

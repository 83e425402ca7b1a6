//! Blocker configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

/// Content blocker update configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockerConfig {
    /// Quiet period before a burst of update requests runs once
    pub debounce_ms: u64,
    /// Maximum number of converted rules handed to the platform
    pub rules_limit: usize,
    /// Rule set installed when filtering is off or conversion fails
    pub empty_blocker_path: PathBuf,
}

impl Default for BlockerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            rules_limit: 50_000,
            empty_blocker_path: PathBuf::from("config/empty.json"),
        }
    }
}

impl BlockerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BlockerConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.rules_limit, 50_000);
        assert_eq!(config.empty_blocker_path, PathBuf::from("config/empty.json"));
    }

    #[test]
    fn test_from_json() {
        let config = BlockerConfig::from_json(r#"{"rules_limit": 10}"#).unwrap();
        assert_eq!(config.rules_limit, 10);
        assert_eq!(config.debounce_ms, 500);
    }
}

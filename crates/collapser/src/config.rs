//! Suppressor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Collapser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressorConfig {
    /// `id` of the managed `<style>` element in every context
    pub style_element_id: String,
    /// Grace period before an emptied sheet is detached
    pub cleanup_delay_ms: u64,
    /// Declaration block used when hiding by selector
    pub hide_style: String,
    /// Declaration block used for `frame`/`iframe`
    pub frame_hide_style: String,
    /// Prefix that scopes selectors to a shadow root's content
    pub shadow_scope_prefix: String,
}

impl Default for SuppressorConfig {
    fn default() -> Self {
        Self {
            style_element_id: "element-collapser-styles".to_string(),
            cleanup_delay_ms: 100,
            hide_style: "display:none!important;".to_string(),
            frame_hide_style: "visibility:hidden!important; height:0px!important;".to_string(),
            shadow_scope_prefix: "::content ".to_string(),
        }
    }
}

impl SuppressorConfig {
    /// Load from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_delay_ms)
    }
}

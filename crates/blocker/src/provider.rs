//! Collaborators of the content blocker controller
//!
//! Rule storage, settings, conversion and the platform API all live outside
//! this crate. The controller only sees these traits.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// User settings consulted on every update
pub trait FilterSettings: Send + Sync {
    fn is_filtering_disabled(&self) -> bool;
    /// Default mode: whitelist entries are exceptions. Otherwise the
    /// whitelist is the list of domains filtering is limited to.
    fn is_default_whitelist_mode(&self) -> bool;
}

/// Request-filter rules currently enabled
pub trait RuleSource: Send + Sync {
    fn request_filter_rules(&self) -> Vec<String>;
}

pub trait WhitelistService: Send + Sync {
    /// Whitelist entries as exception rules
    fn rules(&self) -> Vec<String>;
    fn whitelisted_domains(&self) -> Vec<String>;
}

/// Result of converting rules to the platform's blocking format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// JSON array of blocking directives
    pub converted: String,
    /// Some rules were dropped to stay under the limit
    pub over_limit: bool,
}

pub trait RuleConverter: Send + Sync {
    /// `None` when nothing could be converted
    fn convert(&self, rules: &[String], limit: usize) -> Option<Conversion>;
}

/// Platform content blocker API
#[async_trait]
pub trait ContentBlockerSink: Send + Sync {
    async fn set_content_blocker(&self, rules: &Value) -> Result<()>;
}

//! ContentBlocker - debounced rule set updates
//!
//! ```text
//! update_content_blocker() ×N ──debounce──→ apply_now()
//!                                             │
//!            filtering disabled ──────────────┼──→ empty blocker
//!                                             ↓
//!     request filter rules + whitelist → convert(limit) → parse → sink
//!                                             │ nothing converted
//!                                             └──→ empty blocker
//! ```
//!
//! Bursts of update requests (settings toggled, several filters updated)
//! collapse into one conversion after the quiet period.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, OnceCell};
use uuid::Uuid;

use crate::config::BlockerConfig;
use crate::error::{BlockerError, Result};
use crate::events::{BlockerEvent, EventBus};
use crate::provider::{ContentBlockerSink, FilterSettings, RuleConverter, RuleSource, WhitelistService};
use crate::whitelist::inverted_whitelist_rule;

/// External services the controller drives
#[derive(Clone)]
pub struct Collaborators {
    pub settings: Arc<dyn FilterSettings>,
    pub rule_source: Arc<dyn RuleSource>,
    pub whitelist: Arc<dyn WhitelistService>,
    pub converter: Arc<dyn RuleConverter>,
    pub sink: Arc<dyn ContentBlockerSink>,
}

/// What an update run installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { rules_count: usize, rules_over_limit: bool },
    Cleared,
}

/// Content blocker update controller
#[derive(Clone)]
pub struct ContentBlocker {
    inner: Arc<Inner>,
}

struct Inner {
    config: BlockerConfig,
    services: Collaborators,
    empty_blocker: OnceCell<Value>,
    /// Bumped by every update request; a pending run only fires if it is
    /// still the latest
    generation: AtomicU64,
    events: EventBus,
}

impl ContentBlocker {
    pub fn new(services: Collaborators) -> Self {
        Self::with_config(services, BlockerConfig::default())
    }

    pub fn with_config(services: Collaborators, config: BlockerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                services,
                empty_blocker: OnceCell::new(),
                generation: AtomicU64::new(0),
                events: EventBus::new(),
            }),
        }
    }

    pub fn config(&self) -> &BlockerConfig {
        &self.inner.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BlockerEvent> {
        self.inner.events.subscribe()
    }

    /// Request an update; runs once the debounce period passes without
    /// another request. Must be called within a tokio runtime.
    pub fn update_content_blocker(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = self.inner.clone();

        tokio::spawn(async move {
            tokio::time::sleep(inner.config.debounce()).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                tracing::trace!("[ContentBlocker] Update {} superseded", generation);
                return;
            }
            if let Err(e) = inner.apply().await {
                tracing::error!("[ContentBlocker] Update failed: {}", e);
            }
        });
    }

    /// Run an update immediately, bypassing the debounce
    pub async fn apply_now(&self) -> Result<UpdateOutcome> {
        self.inner.apply().await
    }

    /// Install the empty rule set
    pub async fn clear_filters(&self) -> Result<UpdateOutcome> {
        self.inner.clear_filters().await
    }
}

impl Inner {
    async fn apply(&self) -> Result<UpdateOutcome> {
        let settings = &self.services.settings;
        if settings.is_filtering_disabled() {
            tracing::info!("[ContentBlocker] Disabling content blocker");
            return self.clear_filters().await;
        }

        let run_id = Uuid::now_v7();
        tracing::info!("[ContentBlocker] Starting loading content blocker (run {})", run_id);

        let mut rules = self.services.rule_source.request_filter_rules();
        if settings.is_default_whitelist_mode() {
            rules.extend(self.services.whitelist.rules());
        } else {
            rules.push(inverted_whitelist_rule(&self.services.whitelist.whitelisted_domains()));
        }

        let conversion = self
            .services
            .converter
            .convert(&rules, self.config.rules_limit)
            .filter(|c| !c.converted.is_empty());
        let Some(conversion) = conversion else {
            tracing::info!("[ContentBlocker] Nothing converted (run {})", run_id);
            return self.clear_filters().await;
        };

        let json: Value = match serde_json::from_str(&conversion.converted) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("[ContentBlocker] Converter produced invalid JSON (run {}): {}", run_id, e);
                return self.clear_filters().await;
            }
        };

        let rules_count = json.as_array().map_or(0, Vec::len);
        self.install(&json).await;
        self.events.publish(BlockerEvent::Updated {
            rules_count,
            rules_over_limit: conversion.over_limit,
        });
        Ok(UpdateOutcome::Updated {
            rules_count,
            rules_over_limit: conversion.over_limit,
        })
    }

    async fn clear_filters(&self) -> Result<UpdateOutcome> {
        let empty = self.empty_blocker().await?;
        self.install(empty).await;
        self.events.publish(BlockerEvent::Cleared);
        Ok(UpdateOutcome::Cleared)
    }

    /// Read once, then served from memory
    async fn empty_blocker(&self) -> Result<&Value> {
        self.empty_blocker
            .get_or_try_init(|| async {
                let path = &self.config.empty_blocker_path;
                let text = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| BlockerError::EmptyBlocker {
                        path: path.clone(),
                        source,
                    })?;
                Ok(serde_json::from_str(&text)?)
            })
            .await
    }

    async fn install(&self, json: &Value) {
        let len = json.as_array().map_or(0, Vec::len);
        tracing::info!("[ContentBlocker] Setting content blocker. Length={}", len);
        match self.services.sink.set_content_blocker(json).await {
            Ok(()) => tracing::info!("[ContentBlocker] Content blocker has been set"),
            Err(e) => tracing::error!("[ContentBlocker] Error while setting content blocker: {}", e),
        }
    }
}

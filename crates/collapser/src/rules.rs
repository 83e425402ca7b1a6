//! RuleStore - one managed style sheet per rendering context
//!
//! ```text
//! apply_rule ──→ find or create <style id=..> ──→ insert at end
//! remove_rule ──→ reverse scan, delete matches ──→ empty? ──→ CleanupTicket
//!                                                               ↓
//!                         sleep(cleanup_delay) → re-check → detach
//! ```
//!
//! The sheet's own rule list is the only bookkeeping. Cleanup is never
//! cancelled; a rule inserted during the grace period makes the re-check fail.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::config::SuppressorConfig;
use crate::error::{CollapseError, Result};
use crate::events::{EventBus, StyleScope, SuppressionEvent};
use crate::host::StyleHost;

/// An emptied sheet waiting for its grace period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupTicket<N> {
    pub container: N,
    pub context: Option<N>,
}

/// Inserts and removes hide rules in the managed sheets
#[derive(Clone)]
pub struct RuleStore {
    config: Arc<SuppressorConfig>,
    events: EventBus,
}

impl RuleStore {
    pub fn new(config: Arc<SuppressorConfig>, events: EventBus) -> Self {
        Self { config, events }
    }

    pub fn config(&self) -> &SuppressorConfig {
        &self.config
    }

    /// Selector as stored in the context's sheet
    pub fn prepare_selector<N>(&self, selector: &str, context: Option<N>) -> String {
        match context {
            Some(_) => format!("{}{}", self.config.shadow_scope_prefix, selector.trim()),
            None => selector.trim().to_string(),
        }
    }

    /// Append `selector { css_text }` to the context's sheet
    ///
    /// `css_text` defaults to the configured hide style.
    pub fn apply_rule<H: StyleHost>(
        &self,
        host: &mut H,
        selector: &str,
        css_text: Option<&str>,
        context: Option<H::Node>,
    ) -> Result<()> {
        let body = css_text.unwrap_or(&self.config.hide_style);
        let rule = format!("{}{{{}}}", self.prepare_selector(selector, context), body);
        let scope = StyleScope::of(context);

        let (container, created) = match host.find_style_container(context, &self.config.style_element_id) {
            Some(container) => (container, false),
            None => {
                let container = host.create_style_container(context, &self.config.style_element_id)?;
                tracing::debug!("[RuleStore] Created style sheet for {:?}", scope);
                (container, true)
            }
        };

        let index = host.rule_count(container);
        if let Err(source) = host.insert_rule(container, &rule, index) {
            if created {
                host.detach(container)?;
            }
            tracing::debug!("[RuleStore] Rejected rule {:?}: {}", rule, source);
            return Err(CollapseError::MalformedSelector { rule, source });
        }

        if created {
            self.events.publish(SuppressionEvent::StyleSheetCreated { scope });
        }
        tracing::debug!("[RuleStore] Inserted rule {:?} at {}", rule, index);
        self.events.publish(SuppressionEvent::RuleInserted { scope, rule });
        Ok(())
    }

    /// Delete every rule whose selector equals the prepared `selector`
    ///
    /// Missing sheet is a no-op. Returns a ticket when the sheet is left
    /// empty and should be collected after the grace period.
    pub fn remove_rule<H: StyleHost>(
        &self,
        host: &mut H,
        selector: &str,
        context: Option<H::Node>,
    ) -> Result<Option<CleanupTicket<H::Node>>> {
        let Some(container) = host.find_style_container(context, &self.config.style_element_id) else {
            tracing::trace!("[RuleStore] No style sheet for {:?}, nothing to remove", StyleScope::of(context));
            return Ok(None);
        };

        let prepared = self.prepare_selector(selector, context);
        let mut removed = 0;
        let mut index = host.rule_count(container);
        while index > 0 {
            index -= 1;
            if host.rule_selector(container, index) == Some(prepared.as_str()) {
                host.delete_rule(container, index)?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!("[RuleStore] Removed {} rule(s) for {:?}", removed, prepared);
            self.events.publish(SuppressionEvent::RulesRemoved {
                scope: StyleScope::of(context),
                selector: prepared,
                count: removed,
            });
        }

        if host.rule_count(container) == 0 {
            return Ok(Some(CleanupTicket { container, context }));
        }
        Ok(None)
    }

    /// Detach the ticket's sheet if it is still attached and still empty
    pub fn collect_if_empty<H: StyleHost>(&self, host: &mut H, ticket: CleanupTicket<H::Node>) -> Result<bool> {
        if !host.is_attached(ticket.container) || host.rule_count(ticket.container) != 0 {
            tracing::debug!("[RuleStore] Skipping cleanup, sheet was reused or already removed");
            return Ok(false);
        }

        host.detach(ticket.container)?;
        tracing::debug!("[RuleStore] Removed empty style sheet");
        self.events.publish(SuppressionEvent::StyleSheetRemoved {
            scope: StyleScope::of(ticket.context),
        });
        Ok(true)
    }

    /// Collect the ticket's sheet after the configured delay
    ///
    /// Needs a tokio runtime; without one the empty sheet simply stays and
    /// is reused by the next insertion.
    pub fn schedule_cleanup<H>(&self, document: Arc<RwLock<H>>, ticket: CleanupTicket<H::Node>) -> Option<JoinHandle<()>>
    where
        H: StyleHost + Send + Sync + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::trace!("[RuleStore] No runtime, empty sheet is kept");
            return None;
        };

        let store = self.clone();
        let delay = self.config.cleanup_delay();
        Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut host = document.write().await;
            if let Err(e) = store.collect_if_empty(&mut *host, ticket) {
                tracing::warn!("[RuleStore] Failed to remove empty style sheet: {}", e);
            }
        }))
    }
}

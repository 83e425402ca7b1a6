//! ElementSuppressor - hide, unhide and collapse live elements
//!
//! ```text
//! hide_element(el) ─→ resolve_path ─→ same as recorded? ─yes─→ done
//!                                          │ no
//!                                          ↓
//!                     apply new rule → upsert record → retire old rule
//! ```
//!
//! Every operation holds the document's write lock for its whole duration.
//! The only deferred work is sheet cleanup, which re-validates under the
//! same lock before it detaches anything.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::config::SuppressorConfig;
use crate::error::{CollapseError, Result};
use crate::events::{EventBus, SuppressionEvent};
use crate::hidden::{HiddenRecord, HiddenSet};
use crate::host::StyleHost;
use crate::path::resolve_path;
use crate::rules::RuleStore;
use crate::strategy::{hide_style, inline_target, src_selector};

/// Outcome of `hide_elements`; one element failing does not stop the rest
#[derive(Debug)]
pub struct BatchReport<N> {
    pub hidden: Vec<N>,
    pub failed: Vec<(N, CollapseError)>,
}

impl<N> BatchReport<N> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Element suppression engine over a shared document
pub struct ElementSuppressor<H: StyleHost> {
    document: Arc<RwLock<H>>,
    config: Arc<SuppressorConfig>,
    rules: RuleStore,
    hidden: HiddenSet<H::Node>,
    events: EventBus,
}

impl<H> ElementSuppressor<H>
where
    H: StyleHost + Send + Sync + 'static,
{
    pub fn new(document: Arc<RwLock<H>>) -> Self {
        Self::with_config(document, SuppressorConfig::default())
    }

    pub fn with_config(document: Arc<RwLock<H>>, config: SuppressorConfig) -> Self {
        let config = Arc::new(config);
        let events = EventBus::new();
        Self {
            document,
            rules: RuleStore::new(config.clone(), events.clone()),
            config,
            hidden: HiddenSet::new(),
            events,
        }
    }

    /// Shared handle to the document
    pub fn document(&self) -> Arc<RwLock<H>> {
        self.document.clone()
    }

    pub fn config(&self) -> &SuppressorConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SuppressionEvent> {
        self.events.subscribe()
    }

    /// Hide `element` with a structural rule, replacing any earlier rule
    /// whose path has gone stale
    pub async fn hide_element(&self, element: H::Node, context: Option<H::Node>) -> Result<()> {
        let mut host = self.document.write().await;
        let tag = element_tag(&*host, element)?;
        let selector = resolve_path(&*host, element);

        let previous = self.hidden.get(element);
        if let Some(record) = &previous {
            if record.selector == selector && record.context == context {
                tracing::trace!("[ElementSuppressor] {:?} already hidden by {:?}", element, selector);
                return Ok(());
            }
        }

        self.rules
            .apply_rule(&mut *host, &selector, Some(hide_style(&tag, &self.config)), context)?;

        // The record follows the installed rule even if retiring the old one fails
        self.hidden.insert(
            element,
            HiddenRecord {
                selector: selector.clone(),
                context,
            },
        );

        if let Some(record) = previous {
            tracing::debug!(
                "[ElementSuppressor] Path of {:?} moved from {:?} to {:?}",
                element,
                record.selector,
                selector
            );
            self.retire(&mut *host, &record.selector, record.context)?;
        }

        self.events.publish(SuppressionEvent::ElementHidden { selector });
        Ok(())
    }

    /// Remove the rule hiding `element`; untracked elements are a no-op
    pub async fn unhide_element(&self, element: H::Node, context: Option<H::Node>) -> Result<()> {
        let mut host = self.document.write().await;
        let Some(record) = self.hidden.remove(element) else {
            tracing::trace!("[ElementSuppressor] {:?} is not hidden", element);
            return Ok(());
        };

        self.retire(&mut *host, &record.selector, context)?;
        self.events.publish(SuppressionEvent::ElementUnhidden {
            selector: record.selector,
        });
        Ok(())
    }

    /// One-shot, untracked collapse
    ///
    /// Elements with a non-empty `src` get a `tag[src=".."]` rule so that
    /// later `src` changes need no tracking. Everything else gets an
    /// inline `!important` declaration, written only if it differs from
    /// what is already there.
    pub async fn collapse_element(&self, element: H::Node, context: Option<H::Node>) -> Result<()> {
        let mut host = self.document.write().await;
        let tag = element_tag(&*host, element)?;

        let src = host
            .attribute(element, "src")
            .filter(|src| !src.is_empty())
            .map(str::to_string);
        if let Some(src) = src {
            let selector = src_selector(&tag, &src);
            self.rules
                .apply_rule(&mut *host, &selector, Some(hide_style(&tag, &self.config)), context)?;
            self.events.publish(SuppressionEvent::ElementCollapsed {
                selector: Some(selector),
            });
            return Ok(());
        }

        let (property, value) = inline_target(&tag);
        let collapsed = host.inline_style(element, property) == Some((value, true));
        if collapsed {
            // Rewriting display on <input type=image> reloads the image
            tracing::trace!("[ElementSuppressor] {:?} already collapsed", element);
            return Ok(());
        }

        host.set_inline_style(element, property, value, true)?;
        self.events.publish(SuppressionEvent::ElementCollapsed { selector: None });
        Ok(())
    }

    /// Install `selector { css_text }`, untracked
    pub async fn hide_by_selector(
        &self,
        selector: &str,
        css_text: Option<&str>,
        context: Option<H::Node>,
    ) -> Result<()> {
        let mut host = self.document.write().await;
        self.rules.apply_rule(&mut *host, selector, css_text, context)
    }

    /// Remove every rule installed for `selector` in the context
    pub async fn unhide_by_selector(&self, selector: &str, context: Option<H::Node>) -> Result<()> {
        let mut host = self.document.write().await;
        self.retire(&mut *host, selector, context)
    }

    /// Hide each element, collecting failures instead of stopping
    pub async fn hide_elements(&self, elements: &[H::Node], context: Option<H::Node>) -> BatchReport<H::Node> {
        let mut report = BatchReport {
            hidden: Vec::with_capacity(elements.len()),
            failed: Vec::new(),
        };

        for &element in elements {
            match self.hide_element(element, context).await {
                Ok(()) => report.hidden.push(element),
                Err(e) => {
                    tracing::warn!("[ElementSuppressor] Failed to hide {:?}: {}", element, e);
                    report.failed.push((element, e));
                }
            }
        }
        report
    }

    /// Selector of the rule currently hiding `element`
    pub fn hidden_selector(&self, element: H::Node) -> Option<String> {
        self.hidden.get(element).map(|record| record.selector)
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    /// Drop records of elements that left the document and retire their
    /// rules; returns how many were dropped
    ///
    /// A record whose rule cannot be retired is kept for the next call, and
    /// the first such error is returned after every record was tried.
    pub async fn forget_detached(&self) -> Result<usize> {
        let mut host = self.document.write().await;
        let gone = self.hidden.drain_where(|element| !host.is_connected(element));

        let mut forgotten = 0;
        let mut first_error = None;
        for (element, record) in gone {
            match self.retire(&mut *host, &record.selector, record.context) {
                Ok(()) => {
                    tracing::debug!("[ElementSuppressor] Forgot detached {:?}", element);
                    forgotten += 1;
                }
                Err(e) => {
                    tracing::warn!("[ElementSuppressor] Keeping detached {:?}: {}", element, e);
                    self.hidden.insert(element, record);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(forgotten),
        }
    }

    fn retire(&self, host: &mut H, selector: &str, context: Option<H::Node>) -> Result<()> {
        if let Some(ticket) = self.rules.remove_rule(host, selector, context)? {
            self.rules.schedule_cleanup(self.document.clone(), ticket);
        }
        Ok(())
    }
}

fn element_tag<H: StyleHost>(host: &H, element: H::Node) -> Result<String> {
    host.tag_name(element)
        .map(str::to_string)
        .ok_or_else(|| CollapseError::NotAnElement(format!("{:?}", element)))
}

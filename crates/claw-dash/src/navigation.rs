//! Navigation tree types and the cross-module aggregator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::module::{ModuleError, RequestContext};
use crate::registry::{ModuleRegistry, RegisteredModule};

/// One node of the navigation tree shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    /// Stable identity, derived from `path`, so clients can diff re-renders.
    pub id: Uuid,
    /// Display label.
    pub title: String,
    /// Resolved content path.
    pub path: String,
    /// Child sections, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Navigation>,
}

impl Navigation {
    /// Create a leaf section.
    #[must_use]
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, path.as_bytes()),
            title: title.into(),
            path,
            children: Vec::new(),
        }
    }

    /// Append a child section.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child sections.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

/// How the aggregator reacts to a failing module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    /// Abort on the first failure and discard all sections.
    #[default]
    FailFast,
    /// Log failing modules and return the sections that succeeded.
    SkipFailed,
}

/// Navigation failed for a module under [`NavigationPolicy::FailFast`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("navigation for {prefix} failed: {source}")]
pub struct AggregationError {
    /// Content prefix of the failing module.
    pub prefix: String,
    /// The module's error.
    #[source]
    pub source: ModuleError,
}

/// Result of asking one module for its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// The module produced a section.
    Section(Navigation),
    /// The module failed.
    Failed(AggregationError),
}

/// Composes every module's section into one navigation tree.
#[derive(Debug, Clone)]
pub struct NavigationAggregator {
    registry: Arc<ModuleRegistry>,
    policy: NavigationPolicy,
}

impl NavigationAggregator {
    /// Create an aggregator over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<ModuleRegistry>, policy: NavigationPolicy) -> Self {
        Self { registry, policy }
    }

    /// The failure policy in effect.
    #[must_use]
    pub const fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    /// Top-level sections for `namespace`, in registration order.
    ///
    /// Modules are queried one at a time. Under `FailFast` the first failure
    /// stops the fan-out and no partial result is returned.
    ///
    /// # Errors
    ///
    /// Returns the first module failure when the policy is `FailFast`.
    pub async fn sections(
        &self,
        ctx: &RequestContext,
        namespace: &str,
    ) -> Result<Vec<Navigation>, AggregationError> {
        let mut sections = Vec::with_capacity(self.registry.len());

        for entry in self.registry.iter() {
            match Self::section(entry, ctx, namespace).await {
                SectionOutcome::Section(nav) => sections.push(nav),
                SectionOutcome::Failed(err) => match self.policy {
                    NavigationPolicy::FailFast => {
                        error!(
                            request_id = %ctx.request_id(),
                            prefix = %err.prefix,
                            error = %err.source,
                            "module navigation failed"
                        );
                        return Err(err);
                    }
                    NavigationPolicy::SkipFailed => {
                        warn!(
                            request_id = %ctx.request_id(),
                            prefix = %err.prefix,
                            error = %err.source,
                            "skipping module navigation"
                        );
                    }
                },
            }
        }

        Ok(sections)
    }

    async fn section(
        entry: &RegisteredModule,
        ctx: &RequestContext,
        namespace: &str,
    ) -> SectionOutcome {
        match entry
            .module()
            .navigation(ctx, namespace, entry.prefix())
            .await
        {
            Ok(nav) => SectionOutcome::Section(nav),
            Err(source) => SectionOutcome::Failed(AggregationError {
                prefix: entry.prefix().to_string(),
                source,
            }),
        }
    }
}

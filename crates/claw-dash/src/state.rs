//! Shared state for the dashboard API.

use std::sync::Arc;

use crate::cluster::{
    CurrentNamespace, InfoProvider, NamespaceManager, NamespaceProvider, StaticClusterInfo,
    StaticNamespaces,
};
use crate::config::DashConfig;
use crate::content::ContentRouter;
use crate::navigation::NavigationAggregator;
use crate::rebind::AcceptedHosts;
use crate::registry::ModuleRegistry;

/// Shared, read-only state for every request.
///
/// Built once from a frozen [`ModuleRegistry`]; content handlers are
/// installed at construction.
pub struct DashState {
    config: Arc<DashConfig>,
    registry: Arc<ModuleRegistry>,
    navigation: NavigationAggregator,
    content: ContentRouter,
    accepted_hosts: AcceptedHosts,
    namespaces: Arc<dyn NamespaceProvider>,
    cluster_info: Arc<dyn InfoProvider>,
    namespace_manager: Arc<dyn NamespaceManager>,
}

impl std::fmt::Debug for DashState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashState")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl DashState {
    /// Create state backed by the static collaborators described in `config`.
    #[must_use]
    pub fn new(config: DashConfig, registry: ModuleRegistry) -> Self {
        let namespaces = Arc::new(StaticNamespaces::new(config.namespaces.clone()));
        let cluster_info = Arc::new(StaticClusterInfo::new(config.cluster.clone()));
        let namespace_manager = Arc::new(CurrentNamespace::new(config.default_namespace.clone()));
        Self::with_collaborators(config, registry, namespaces, cluster_info, namespace_manager)
    }

    /// Create state with explicit cluster collaborators.
    #[must_use]
    pub fn with_collaborators(
        config: DashConfig,
        registry: ModuleRegistry,
        namespaces: Arc<dyn NamespaceProvider>,
        cluster_info: Arc<dyn InfoProvider>,
        namespace_manager: Arc<dyn NamespaceManager>,
    ) -> Self {
        let registry = Arc::new(registry);
        let navigation = NavigationAggregator::new(registry.clone(), config.navigation_policy);
        let content = ContentRouter::install(&registry);
        let accepted_hosts = AcceptedHosts::new(&config.accepted_hosts);

        Self {
            config: Arc::new(config),
            registry,
            navigation,
            content,
            accepted_hosts,
            namespaces,
            cluster_info,
            namespace_manager,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    /// The frozen module registry.
    #[must_use]
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The navigation aggregator.
    #[must_use]
    pub const fn navigation(&self) -> &NavigationAggregator {
        &self.navigation
    }

    /// The content router.
    #[must_use]
    pub const fn content(&self) -> &ContentRouter {
        &self.content
    }

    /// Hosts accepted by the rebinding guard.
    #[must_use]
    pub fn accepted_hosts(&self) -> AcceptedHosts {
        self.accepted_hosts.clone()
    }

    /// The namespace provider.
    #[must_use]
    pub fn namespaces(&self) -> &dyn NamespaceProvider {
        self.namespaces.as_ref()
    }

    /// The cluster info provider.
    #[must_use]
    pub fn cluster_info(&self) -> &dyn InfoProvider {
        self.cluster_info.as_ref()
    }

    /// The current-namespace holder.
    #[must_use]
    pub fn namespace_manager(&self) -> &dyn NamespaceManager {
        self.namespace_manager.as_ref()
    }
}

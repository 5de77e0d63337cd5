//! Cluster collaborators consumed by the API.
//!
//! The API never talks to a cluster directly. Namespace listing, cluster
//! info and the current-namespace setting sit behind these traits; static
//! implementations back the standalone binary and the tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace used when nothing else has been selected.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Errors from cluster collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    /// The cluster could not be reached.
    #[error("cluster unavailable: {0}")]
    Unavailable(String),

    /// The query reached the cluster but failed.
    #[error("cluster query failed: {0}")]
    Query(String),
}

/// Connection details for the cluster the dashboard is pointed at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// Name of the active kubeconfig context.
    pub context: String,
    /// Cluster name.
    pub cluster: String,
    /// API server URL.
    pub server: String,
    /// Authenticated user.
    pub user: String,
}

/// Lists namespaces visible to the dashboard.
#[async_trait]
pub trait NamespaceProvider: Send + Sync {
    /// Namespace names.
    async fn list(&self) -> Result<Vec<String>, ClusterError>;
}

/// Describes the connected cluster.
#[async_trait]
pub trait InfoProvider: Send + Sync {
    /// Current cluster info.
    async fn get(&self) -> Result<ClusterInfo, ClusterError>;
}

/// Holds the namespace the dashboard is currently scoped to.
pub trait NamespaceManager: Send + Sync {
    /// The current namespace.
    fn current(&self) -> String;

    /// Change the current namespace.
    fn set(&self, namespace: &str);
}

/// Fixed namespace list.
#[derive(Debug, Clone, Default)]
pub struct StaticNamespaces {
    namespaces: Vec<String>,
}

impl StaticNamespaces {
    /// Serve `namespaces` as-is.
    pub fn new(namespaces: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl NamespaceProvider for StaticNamespaces {
    async fn list(&self) -> Result<Vec<String>, ClusterError> {
        Ok(self.namespaces.clone())
    }
}

/// Fixed cluster info.
#[derive(Debug, Clone, Default)]
pub struct StaticClusterInfo {
    info: ClusterInfo,
}

impl StaticClusterInfo {
    /// Serve `info` as-is.
    #[must_use]
    pub const fn new(info: ClusterInfo) -> Self {
        Self { info }
    }
}

#[async_trait]
impl InfoProvider for StaticClusterInfo {
    async fn get(&self) -> Result<ClusterInfo, ClusterError> {
        Ok(self.info.clone())
    }
}

/// In-memory current namespace.
#[derive(Debug)]
pub struct CurrentNamespace {
    namespace: RwLock<String>,
}

impl CurrentNamespace {
    /// Start scoped to `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: RwLock::new(namespace.into()),
        }
    }
}

impl Default for CurrentNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl NamespaceManager for CurrentNamespace {
    fn current(&self) -> String {
        self.namespace.read().clone()
    }

    fn set(&self, namespace: &str) {
        *self.namespace.write() = namespace.to_string();
    }
}

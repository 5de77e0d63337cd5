//! Dashboard API configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cluster::{ClusterInfo, DEFAULT_NAMESPACE};
use crate::navigation::NavigationPolicy;
use crate::rebind::DEFAULT_ACCEPTED_HOSTS;

/// Prefix the API is mounted under by default.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON for this schema.
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the dashboard API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// Path prefix every API route is mounted under.
    pub api_prefix: String,
    /// Host names accepted by the rebinding guard.
    pub accepted_hosts: Vec<String>,
    /// How navigation reacts to a failing module.
    pub navigation_policy: NavigationPolicy,
    /// Namespace selected at startup.
    pub default_namespace: String,
    /// Namespaces served by the static namespace provider.
    pub namespaces: Vec<String>,
    /// Cluster info served by the static info provider.
    pub cluster: ClusterInfo,
    /// Directory of JSON documents served by the local content module.
    pub local_content_dir: Option<PathBuf>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7777)),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            accepted_hosts: DEFAULT_ACCEPTED_HOSTS.iter().map(ToString::to_string).collect(),
            navigation_policy: NavigationPolicy::default(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            namespaces: vec![DEFAULT_NAMESPACE.to_string()],
            cluster: ClusterInfo::default(),
            local_content_dir: None,
        }
    }
}

impl DashConfig {
    /// Create a new configuration with the specified bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail at router construction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "api_prefix must start with '/': {}",
                self.api_prefix
            )));
        }
        if self.api_prefix.contains(['{', '}', '*']) {
            return Err(ConfigError::Invalid(format!(
                "api_prefix must be a literal path: {}",
                self.api_prefix
            )));
        }
        if self.accepted_hosts.is_empty() {
            return Err(ConfigError::Invalid(
                "accepted_hosts must not be empty".to_string(),
            ));
        }
        if self.default_namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The API prefix without a trailing slash; empty when mounted at root.
    #[must_use]
    pub fn mount_prefix(&self) -> &str {
        self.api_prefix.trim_end_matches('/')
    }

    /// Set the bind address.
    #[must_use]
    pub const fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the API prefix.
    #[must_use]
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Replace the accepted host list.
    #[must_use]
    pub fn with_accepted_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the navigation failure policy.
    #[must_use]
    pub const fn with_navigation_policy(mut self, policy: NavigationPolicy) -> Self {
        self.navigation_policy = policy;
        self
    }

    /// Set the namespace selected at startup.
    #[must_use]
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Serve JSON documents from `dir` through the local content module.
    #[must_use]
    pub fn with_local_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_content_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DashConfig::default();

        assert_eq!(config.bind_addr.port(), 7777);
        assert!(config.bind_addr.ip().is_loopback());
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.accepted_hosts, vec!["localhost", "127.0.0.1"]);
        assert_eq!(config.navigation_policy, NavigationPolicy::FailFast);
        assert_eq!(config.default_namespace, "default");
        assert!(config.local_content_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 9000));
        let config = DashConfig::new(addr)
            .with_api_prefix("/dash/")
            .with_accepted_hosts(["dash.internal"])
            .with_navigation_policy(NavigationPolicy::SkipFailed)
            .with_default_namespace("kube-system")
            .with_local_content_dir("/tmp/content");

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.mount_prefix(), "/dash");
        assert_eq!(config.accepted_hosts, vec!["dash.internal"]);
        assert_eq!(config.navigation_policy, NavigationPolicy::SkipFailed);
        assert_eq!(config.default_namespace, "kube-system");
        assert_eq!(config.local_content_dir, Some(PathBuf::from("/tmp/content")));
    }

    #[test]
    fn test_mount_prefix_root() {
        assert_eq!(DashConfig::default().with_api_prefix("/").mount_prefix(), "");
        assert_eq!(DashConfig::default().with_api_prefix("").mount_prefix(), "");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(DashConfig::default().with_api_prefix("api").validate().is_err());
        assert!(DashConfig::default().with_api_prefix("/api/{x}").validate().is_err());
        assert!(DashConfig::default()
            .with_accepted_hosts(Vec::<String>::new())
            .validate()
            .is_err());
        assert!(DashConfig::default().with_default_namespace(" ").validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_prefix": "/dash", "navigation_policy": "skip_failed", "namespaces": ["a", "b"]}}"#
        )
        .unwrap();

        let config = DashConfig::load(file.path()).unwrap();

        assert_eq!(config.api_prefix, "/dash");
        assert_eq!(config.navigation_policy, NavigationPolicy::SkipFailed);
        assert_eq!(config.namespaces, vec!["a", "b"]);
        assert_eq!(config.bind_addr.port(), 7777);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DashConfig::load(Path::new("/nonexistent/claw-dash.json")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = DashConfig::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

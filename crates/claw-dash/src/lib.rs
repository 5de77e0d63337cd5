//! # claw-dash
//!
//! Module registry and request dispatch for the Clawbernetes cluster
//! dashboard API.
//!
//! Independently written modules each own one subtree of dashboard content.
//! This crate composes them into a single HTTP surface: one navigation tree
//! aggregated across every module, and content requests routed to the module
//! owning the longest matching path prefix. Every request first passes a
//! DNS-rebinding guard that checks `Host` against an allow-list.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use claw_dash::{DashConfig, DashServer, DashState, LocalContent, RegistryBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DashConfig::default();
//!
//!     let mut builder = RegistryBuilder::new();
//!     builder.register(Arc::new(LocalContent::new("./content")))?;
//!
//!     let server = DashServer::new(DashState::new(config.clone(), builder.build()));
//!     server.serve(config.bind_addr).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! All paths are relative to the configured prefix (default `/api/v1`).
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/namespaces` | GET | List namespaces |
//! | `/navigation` | GET | Navigation for the current namespace |
//! | `/navigation/namespace/{namespace}` | GET | Navigation for a namespace |
//! | `/namespace` | GET, POST | Read or change the current namespace |
//! | `/cluster-info` | any | Connected cluster details |
//! | `/content/{module}/...` | any | Module content |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cluster;
pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod local;
pub mod module;
pub mod navigation;
pub mod rebind;
pub mod registry;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use cluster::{
    ClusterError, ClusterInfo, CurrentNamespace, InfoProvider, NamespaceManager,
    NamespaceProvider, StaticClusterInfo, StaticNamespaces,
};
pub use config::{ConfigError, DashConfig};
pub use content::ContentRouter;
pub use error::{respond_with_error, ApiError, ApiResult, ErrorResponse};
pub use local::LocalContent;
pub use module::{ContentHandler, ContentRequest, Module, ModuleError, RequestContext};
pub use navigation::{AggregationError, Navigation, NavigationAggregator, NavigationPolicy};
pub use rebind::AcceptedHosts;
pub use registry::{ModuleRegistry, RegistryBuilder, RegistryError};
pub use server::{DashServer, ServerError};
pub use state::DashState;

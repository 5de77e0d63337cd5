//! Content routing.
//!
//! Requests under [`CONTENT_ROOT`] are resolved to the module owning the
//! longest registered prefix of the request path and handed to that module's
//! [`ContentHandler`] with the remaining path.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use tracing::{debug, error};

use crate::error::{ApiError, ApiResult};
use crate::module::{ContentHandler, ContentRequest, RequestContext};
use crate::registry::{ModuleRegistry, CONTENT_ROOT};

/// Path segment that selects a namespace inside a module's content path.
const NAMESPACE_SEGMENT: &str = "namespace";

/// A content path resolved to its owning handler.
pub struct ResolvedContent<'r, 'p> {
    /// Matched module prefix.
    pub prefix: &'r str,
    /// Handler installed for that prefix.
    pub handler: &'r Arc<dyn ContentHandler>,
    /// Remainder of the path beneath the prefix, without surrounding slashes.
    pub suffix: &'p str,
}

impl fmt::Debug for ResolvedContent<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedContent")
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .finish_non_exhaustive()
    }
}

/// Prefix table of installed content handlers.
#[derive(Default)]
pub struct ContentRouter {
    routes: HashMap<String, Arc<dyn ContentHandler>>,
}

impl fmt::Debug for ContentRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefixes: Vec<&String> = self.routes.keys().collect();
        prefixes.sort();
        f.debug_struct("ContentRouter")
            .field("prefixes", &prefixes)
            .finish()
    }
}

impl ContentRouter {
    /// Install a handler for every module in `registry`.
    ///
    /// A module whose handler cannot be constructed is logged and skipped;
    /// its content is unreachable but every other module is still served.
    #[must_use]
    pub fn install(registry: &ModuleRegistry) -> Self {
        let mut routes = HashMap::with_capacity(registry.len());

        for entry in registry.iter() {
            match entry.module().content_handler(entry.prefix()) {
                Ok(handler) => {
                    debug!(prefix = %entry.prefix(), "installed content routes");
                    routes.insert(entry.prefix().to_string(), handler);
                }
                Err(err) => {
                    error!(prefix = %entry.prefix(), error = %err, "register routers");
                }
            }
        }

        Self { routes }
    }

    /// Number of installed prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no prefixes are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Whether a handler is installed for exactly `prefix`.
    #[must_use]
    pub fn is_installed(&self, prefix: &str) -> bool {
        self.routes.contains_key(prefix)
    }

    /// Resolve `path` (e.g. `/content/overview/pods`) to the handler with
    /// the longest matching prefix. Matches fall on segment boundaries.
    #[must_use]
    pub fn resolve<'r, 'p>(&'r self, path: &'p str) -> Option<ResolvedContent<'r, 'p>> {
        let path = path.trim_end_matches('/');
        if !path.starts_with(CONTENT_ROOT) {
            return None;
        }

        let mut candidate = path;
        while candidate.len() > CONTENT_ROOT.len() {
            if let Some((prefix, handler)) = self.routes.get_key_value(candidate) {
                return Some(ResolvedContent {
                    prefix,
                    handler,
                    suffix: path[candidate.len()..].trim_matches('/'),
                });
            }
            let cut = candidate.rfind('/')?;
            candidate = &candidate[..cut];
        }

        None
    }

    /// Route a content request and return the module's JSON content.
    ///
    /// `fallback_namespace` is used unless the path beneath the prefix starts
    /// with `namespace/{name}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no prefix matches and
    /// [`ApiError::Content`] when the module fails.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: Option<String>,
        fallback_namespace: &str,
    ) -> ApiResult<serde_json::Value> {
        let Some(resolved) = self.resolve(path) else {
            debug!(path, "no content prefix matched");
            return Err(ApiError::NotFound);
        };

        let (namespace, suffix) = split_namespace(resolved.suffix);
        let request = ContentRequest {
            method,
            namespace: namespace.unwrap_or(fallback_namespace).to_string(),
            path: suffix.to_string(),
            query,
        };

        debug!(
            request_id = %ctx.request_id(),
            prefix = resolved.prefix,
            namespace = %request.namespace,
            path = %request.path,
            "dispatching content request"
        );

        resolved
            .handler
            .content(ctx, request)
            .await
            .map_err(|source| ApiError::Content {
                prefix: resolved.prefix.to_string(),
                source,
            })
    }
}

/// Split a leading `namespace/{name}` off a module-relative path.
fn split_namespace(suffix: &str) -> (Option<&str>, &str) {
    let mut parts = suffix.splitn(3, '/');
    match (parts.next(), parts.next()) {
        (Some(NAMESPACE_SEGMENT), Some(namespace)) if !namespace.is_empty() => {
            (Some(namespace), parts.next().unwrap_or("").trim_matches('/'))
        }
        _ => (None, suffix),
    }
}

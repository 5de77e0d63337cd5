//! The capability every dashboard module implements.
//!
//! A module owns one subtree of dashboard content. It contributes a single
//! top-level navigation section per namespace and serves the content found
//! beneath its prefix. The core only ever sees modules as trait objects.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Method;
use thiserror::Error;
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

use crate::navigation::Navigation;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors a module may return from navigation or content calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModuleError {
    /// Requested content does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The request was malformed for this module.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The module cannot serve right now (e.g. its backing store is missing).
    #[error("module unavailable: {0}")]
    Unavailable(String),

    /// The request context was cancelled before the module finished.
    #[error("request cancelled")]
    Cancelled,

    /// Any other failure inside the module.
    #[error("module error: {0}")]
    Internal(String),
}

/// Per-request context threaded into every module call.
///
/// The cancellation token fires when the request is abandoned. Modules are
/// expected to observe it and return promptly; the core imposes no timeout.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Create a context with a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4())
    }

    /// Create a context with the given request id.
    #[must_use]
    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            cancel: CancellationToken::new(),
        }
    }

    /// The request id.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Token cancelled when the request is abandoned.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the request has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Guard that cancels this context when dropped.
    ///
    /// Handlers hold it for the lifetime of the request future so a client
    /// disconnect propagates to in-flight module calls.
    #[must_use]
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.cancel.clone().drop_guard()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .unwrap_or_else(Uuid::new_v4);
        Ok(Self::with_request_id(request_id))
    }
}

/// A content request routed to a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    /// HTTP method of the inbound request.
    pub method: Method,
    /// Namespace the content is scoped to.
    pub namespace: String,
    /// Path beneath the module's prefix, without leading or trailing slashes.
    pub path: String,
    /// Raw query string, if any.
    pub query: Option<String>,
}

/// Serves the content found beneath one module's prefix.
#[async_trait]
pub trait ContentHandler: Send + Sync {
    /// Produce the JSON content for `request`.
    async fn content(
        &self,
        ctx: &RequestContext,
        request: ContentRequest,
    ) -> Result<serde_json::Value, ModuleError>;
}

/// A pluggable content provider.
#[async_trait]
pub trait Module: Send + Sync {
    /// Path segment under the content root where this module is served.
    fn content_path(&self) -> &str;

    /// Build this module's navigation section for `namespace`.
    ///
    /// `content_path` is the module's full resolved prefix, for use in the
    /// paths of the returned tree.
    async fn navigation(
        &self,
        ctx: &RequestContext,
        namespace: &str,
        content_path: &str,
    ) -> Result<Navigation, ModuleError>;

    /// Construct the handler bound to `prefix` at route installation.
    fn content_handler(&self, prefix: &str) -> Result<Arc<dyn ContentHandler>, ModuleError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_context_ids_are_unique() {
        let a = RequestContext::new();
        let b = RequestContext::new();

        assert_ne!(a.request_id(), b.request_id());
        assert!(!a.is_cancelled());
    }

    #[test]
    fn test_cancel_on_drop() {
        let ctx = RequestContext::new();
        let observer = ctx.clone();

        {
            let _guard = ctx.cancel_on_drop();
            assert!(!observer.is_cancelled());
        }

        assert!(observer.is_cancelled());
    }

    #[tokio::test]
    async fn test_extractor_uses_request_id_header() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, id.to_string())
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();

        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(ctx.request_id(), id);
    }

    #[tokio::test]
    async fn test_extractor_ignores_malformed_request_id() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();

        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();

        assert!(!ctx.request_id().is_nil());
    }

    #[test]
    fn test_module_error_display() {
        assert_eq!(
            ModuleError::NotFound("pods.json".to_string()).to_string(),
            "pods.json not found"
        );
        assert_eq!(ModuleError::Cancelled.to_string(), "request cancelled");
    }
}

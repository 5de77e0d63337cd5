//! DNS-rebinding protection.
//!
//! The dashboard listens on loopback. A page on another origin can still
//! reach it by pointing its own hostname at 127.0.0.1, but the browser will
//! send that hostname in `Host`. Requests are only served when the host is
//! on the accepted list.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::ApiError;

/// Hosts served when no list is configured.
pub const DEFAULT_ACCEPTED_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Allow-list of host names, compared case-insensitively without port.
#[derive(Debug, Clone)]
pub struct AcceptedHosts {
    hosts: Arc<[String]>,
}

impl AcceptedHosts {
    /// Build an allow-list from host names.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts: Vec<String> = hosts
            .into_iter()
            .map(|h| h.as_ref().trim_end_matches('.').to_ascii_lowercase())
            .collect();
        Self {
            hosts: hosts.into(),
        }
    }

    /// Whether the `Host` header value `host` is accepted.
    #[must_use]
    pub fn allows(&self, host: &str) -> bool {
        let name = host_name(host).trim_end_matches('.');
        !name.is_empty() && self.hosts.iter().any(|h| h.eq_ignore_ascii_case(name))
    }

    /// The accepted host names.
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }
}

impl Default for AcceptedHosts {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEPTED_HOSTS)
    }
}

/// Strip the port (and IPv6 brackets) from a `Host` header value.
#[must_use]
pub fn host_name(host: &str) -> &str {
    let host = host.trim();
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(addr, _)| addr);
    }
    match host.split_once(':') {
        // A second colon means a bare IPv6 address without a port.
        Some((name, port)) if !port.contains(':') => name,
        _ => host,
    }
}

/// Middleware rejecting requests whose host is not accepted.
///
/// Runs ahead of every handler, including the not-found fallback.
pub async fn rebind_guard(
    State(accepted): State<AcceptedHosts>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default();

    if !accepted.allows(host) {
        warn!(host, path = %request.uri().path(), "rejected request for unaccepted host");
        return ApiError::ForbiddenHost(host.to_string()).into_response();
    }

    next.run(request).await
}

//! HTTP request handlers for the dashboard API.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, RawQuery, State};
use axum::http::Method;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{serve_as_json, ApiError, ApiResult};
use crate::module::RequestContext;
use crate::navigation::Navigation;
use crate::registry::CONTENT_ROOT;
use crate::state::DashState;

/// Response body for `GET /namespaces`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacesResponse {
    /// Namespace names.
    pub namespaces: Vec<String>,
}

/// Response body for the navigation routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationResponse {
    /// Top-level sections in module registration order.
    pub sections: Vec<Navigation>,
}

/// Request and response body for `/namespace`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceBody {
    /// Namespace name.
    pub namespace: String,
}

/// Handle GET /namespaces - list namespaces.
pub async fn list_namespaces(State(state): State<Arc<DashState>>) -> ApiResult<Response> {
    let namespaces = state.namespaces().list().await?;
    Ok(serve_as_json(&NamespacesResponse { namespaces }))
}

/// Handle GET /navigation - sections for the current namespace.
pub async fn get_navigation(
    State(state): State<Arc<DashState>>,
    ctx: RequestContext,
) -> ApiResult<Response> {
    let namespace = state.namespace_manager().current();
    navigation_for(&state, &ctx, &namespace).await
}

/// Handle GET /navigation/namespace/:namespace - sections for a namespace.
pub async fn get_namespaced_navigation(
    State(state): State<Arc<DashState>>,
    ctx: RequestContext,
    namespace: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(namespace) = namespace.map_err(invalid_path)?;
    navigation_for(&state, &ctx, &namespace).await
}

async fn navigation_for(
    state: &DashState,
    ctx: &RequestContext,
    namespace: &str,
) -> ApiResult<Response> {
    let _cancel = ctx.cancel_on_drop();
    let sections = state.navigation().sections(ctx, namespace).await?;
    Ok(serve_as_json(&NavigationResponse { sections }))
}

/// Handle GET /namespace - read the current namespace.
pub async fn read_namespace(State(state): State<Arc<DashState>>) -> Response {
    serve_as_json(&NamespaceBody {
        namespace: state.namespace_manager().current(),
    })
}

/// Handle POST /namespace - change the current namespace.
pub async fn update_namespace(
    State(state): State<Arc<DashState>>,
    body: Result<Json<NamespaceBody>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body.map_err(|rejection| {
        error!(error = %rejection, "decoding namespace update");
        ApiError::InvalidRequest("unable to decode request".to_string())
    })?;

    let namespace = body.namespace.trim();
    if namespace.is_empty() {
        return Err(ApiError::InvalidRequest(
            "namespace must not be empty".to_string(),
        ));
    }

    state.namespace_manager().set(namespace);
    info!(namespace, "updated current namespace");

    Ok(serve_as_json(&NamespaceBody {
        namespace: namespace.to_string(),
    }))
}

/// Handle /cluster-info - describe the connected cluster.
pub async fn cluster_info(State(state): State<Arc<DashState>>) -> ApiResult<Response> {
    let info = state.cluster_info().get().await?;
    Ok(serve_as_json(&info))
}

/// Handle any method on /content/*path - dispatch to the owning module.
pub async fn content(
    State(state): State<Arc<DashState>>,
    ctx: RequestContext,
    method: Method,
    path: Result<Path<String>, PathRejection>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    let Path(path) = path.map_err(invalid_path)?;
    let _cancel = ctx.cancel_on_drop();
    let path = format!("{CONTENT_ROOT}/{path}");
    let namespace = state.namespace_manager().current();

    let value = state
        .content()
        .dispatch(&ctx, method, &path, query, &namespace)
        .await?;
    Ok(serve_as_json(&value))
}

fn invalid_path(rejection: PathRejection) -> ApiError {
    info!(error = %rejection, "decoding path parameter");
    ApiError::InvalidRequest("invalid path".to_string())
}

/// Fallback for a known route called with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: axum::http::Uri) -> ApiError {
    info!(%method, %uri, "method not allowed");
    ApiError::MethodNotAllowed
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: axum::http::Uri) -> ApiError {
    error!(%method, %uri, "api handler not found");
    ApiError::NotFound
}

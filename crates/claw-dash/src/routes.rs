//! Route configuration for the dashboard API.

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{any, get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    cluster_info, content, get_namespaced_navigation, get_navigation, list_namespaces,
    method_not_allowed, not_found, read_namespace, update_namespace,
};
use crate::rebind::rebind_guard;
use crate::state::DashState;

/// Create the dashboard API router.
///
/// Every route, including the not-found fallback, sits behind the
/// rebinding guard.
pub fn create_router(state: Arc<DashState>) -> Router {
    let accepted_hosts = state.accepted_hosts();
    let prefix = state.config().mount_prefix().to_string();

    let api_routes = Router::new()
        .route("/namespaces", get(list_namespaces))
        // No namespace (current) or namespace in the path
        .route("/navigation", get(get_navigation))
        .route("/navigation/namespace/{namespace}", get(get_namespaced_navigation))
        .route("/namespace", get(read_namespace).post(update_namespace))
        .route("/cluster-info", any(cluster_info))
        .route("/content/{*path}", any(content))
        .method_not_allowed_fallback(method_not_allowed);

    let router = if prefix.is_empty() {
        Router::new().merge(api_routes)
    } else {
        Router::new().nest(&prefix, api_routes)
    };

    router
        .fallback(not_found)
        .with_state(state)
        .layer(from_fn_with_state(accepted_hosts, rebind_guard))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashConfig;
    use crate::registry::tests::StubModule;
    use crate::registry::{ModuleRegistry, RegistryBuilder};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use test_case::test_case;
    use tower::ServiceExt;

    fn make_test_state() -> Arc<DashState> {
        let mut builder = RegistryBuilder::new();
        builder.register(StubModule::arc("overview")).unwrap();
        builder.register(StubModule::arc("local")).unwrap();
        Arc::new(DashState::new(DashConfig::default(), builder.build()))
    }

    fn get_request(uri: &str, host: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_navigation_endpoint() {
        let app = create_router(make_test_state());

        let response = app
            .oneshot(get_request("/api/v1/navigation", "localhost:7777"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let json = body_json(response).await;
        let sections = json["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0]["path"], "/content/overview");
        assert_eq!(sections[1]["path"], "/content/local");
    }

    #[tokio::test]
    async fn test_namespaced_navigation_endpoint() {
        let app = create_router(make_test_state());

        let response = app
            .oneshot(get_request(
                "/api/v1/navigation/namespace/kube-system",
                "localhost",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["sections"][0]["title"], "overview (kube-system)");
    }

    #[tokio::test]
    async fn test_content_endpoint() {
        let app = create_router(make_test_state());

        let response = app
            .oneshot(get_request("/api/v1/content/overview/x/y", "127.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["path"], "x/y");
        assert_eq!(json["namespace"], "default");
    }

    #[tokio::test]
    async fn test_namespace_update_roundtrip() {
        let state = make_test_state();
        let app = create_router(state.clone());

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/namespace")
            .header(header::HOST, "localhost")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"namespace":"kube-system"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request("/api/v1/namespace", "localhost"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["namespace"], "kube-system");
    }

    #[tokio::test]
    async fn test_namespace_update_malformed_body() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/namespace")
            .header(header::HOST, "localhost")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], 400);
    }

    #[tokio::test]
    async fn test_cluster_info_any_method() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/cluster-info")
            .header(header::HOST, "localhost")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let app = create_router(make_test_state());

        let response = app
            .oneshot(get_request("/does-not-exist", "localhost"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(
            json,
            serde_json::json!({"error": {"code": 404, "message": "not found"}})
        );
    }

    #[tokio::test]
    async fn test_unknown_api_endpoint() {
        let app = create_router(make_test_state());

        let response = app
            .oneshot(get_request("/api/v1/unknown", "localhost"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "not found");
    }

    #[tokio::test]
    async fn test_unknown_content_prefix() {
        let app = create_router(make_test_state());

        let response = app
            .oneshot(get_request("/api/v1/content/missing/x", "localhost"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test_case("POST", "/api/v1/namespaces" ; "post namespaces")]
    #[test_case("DELETE", "/api/v1/navigation" ; "delete navigation")]
    #[test_case("PUT", "/api/v1/namespace" ; "put namespace")]
    #[tokio::test]
    async fn test_wrong_method_uses_error_envelope(method: &str, uri: &str) {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, "localhost")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json = body_json(response).await;
        assert_eq!(
            json,
            serde_json::json!({"error": {"code": 405, "message": "method not allowed"}})
        );
    }

    #[test_case("/api/v1/navigation/namespace/%FF" ; "namespace")]
    #[test_case("/api/v1/content/%FF/x" ; "content")]
    #[tokio::test]
    async fn test_undecodable_path_uses_error_envelope(uri: &str) {
        let app = create_router(make_test_state());

        let response = app.oneshot(get_request(uri, "localhost")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json = body_json(response).await;
        assert_eq!(
            json,
            serde_json::json!({"error": {"code": 400, "message": "invalid path"}})
        );
    }

    #[test_case("/api/v1/navigation" ; "navigation")]
    #[test_case("/api/v1/navigation/namespace/default" ; "namespaced navigation")]
    #[test_case("/api/v1/namespaces" ; "namespaces")]
    #[test_case("/api/v1/namespace" ; "namespace")]
    #[test_case("/api/v1/cluster-info" ; "cluster info")]
    #[test_case("/api/v1/content/overview/x" ; "content")]
    #[test_case("/does-not-exist" ; "fallback")]
    #[tokio::test]
    async fn test_rebinding_rejected_everywhere(uri: &str) {
        let app = create_router(make_test_state());

        let response = app
            .oneshot(get_request(uri, "attacker.example.com"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "forbidden");
    }

    #[tokio::test]
    async fn test_root_mounted_api() {
        let state = Arc::new(DashState::new(
            DashConfig::default().with_api_prefix("/"),
            ModuleRegistry::default(),
        ));
        let app = create_router(state);

        let response = app
            .oneshot(get_request("/namespaces", "localhost"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}

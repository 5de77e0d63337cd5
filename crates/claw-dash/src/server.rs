//! Dashboard API server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::create_router;
use crate::state::DashState;

/// Errors starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, #[source] std::io::Error),

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// HTTP server for the dashboard API.
#[derive(Debug, Clone)]
pub struct DashServer {
    state: Arc<DashState>,
}

impl DashServer {
    /// Create a server over frozen state.
    #[must_use]
    pub fn new(state: DashState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Start the server and listen for connections.
    ///
    /// This method runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> Result<(), ServerError> {
        self.serve_with_shutdown(addr, std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided future completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(
        &self,
        addr: SocketAddr,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(addr, e))?;

        let local_addr = listener.local_addr()?;
        info!(
            addr = %local_addr,
            prefix = self.state.config().mount_prefix(),
            modules = self.state.registry().len(),
            "Dashboard API listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Dashboard API shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    ///
    /// Useful for testing or embedding in another server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashConfig;
    use crate::registry::ModuleRegistry;

    fn make_test_server() -> DashServer {
        DashServer::new(DashState::new(DashConfig::default(), ModuleRegistry::default()))
    }

    #[tokio::test]
    async fn test_router_serves_api() {
        use axum::body::Body;
        use axum::http::{header, Request, StatusCode};
        use tower::ServiceExt;

        let request = Request::builder()
            .uri("/api/v1/namespaces")
            .header(header::HOST, "localhost")
            .body(Body::empty())
            .unwrap();
        let response = make_test_server().router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_serve_with_shutdown() {
        let server = make_test_server();
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let server_handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(addr, async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let _ = shutdown_tx.send(());

        let result = tokio::time::timeout(std::time::Duration::from_secs(1), server_handle).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_serve_bind_failure() {
        let holder = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = holder.local_addr().unwrap();
        let server = make_test_server();

        let result = server.serve(addr).await;

        assert!(matches!(result, Err(ServerError::BindFailed(_, _))));
    }
}

//! Error types and the JSON error envelope for the dashboard API.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cluster::ClusterError;
use crate::module::ModuleError;
use crate::navigation::AggregationError;

/// Content type used for every API response body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to API clients.
///
/// Each variant maps to a status code and a client-facing message. The
/// underlying cause is logged and never sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No route or content prefix matched the request.
    #[error("not found")]
    NotFound,

    /// The route exists but does not accept the request method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The request `Host` header is not on the accepted list.
    #[error("forbidden host: {0}")]
    ForbiddenHost(String),

    /// Malformed request from the client.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A module failed while building navigation.
    #[error(transparent)]
    Navigation(#[from] AggregationError),

    /// A module failed while serving content.
    #[error("content for {prefix} failed: {source}")]
    Content {
        /// Content prefix of the owning module.
        prefix: String,
        /// Module failure.
        #[source]
        source: ModuleError,
    },

    /// An external cluster collaborator failed.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

impl ApiError {
    /// Status code and client-facing message for this error.
    #[must_use]
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method not allowed".to_string(),
            ),
            Self::ForbiddenHost(_) => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Navigation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unable to generate navigation".to_string(),
            ),
            Self::Content { source, .. } => match source {
                ModuleError::NotFound(_) => (StatusCode::NOT_FOUND, "not found".to_string()),
                ModuleError::InvalidRequest(_) => {
                    (StatusCode::BAD_REQUEST, "invalid request".to_string())
                }
                ModuleError::Cancelled | ModuleError::Unavailable(_) | ModuleError::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unable to serve content".to_string(),
                ),
            },
            Self::Cluster(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unable to query cluster".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else if matches!(self, Self::Content { .. }) {
            warn!(error = %self, "content request rejected");
        }
        respond_with_error(status, &message)
    }
}

/// Code and message carried inside the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// HTTP status code.
    pub code: u16,
    /// Client-facing message.
    pub message: String,
}

/// JSON error envelope: `{"error":{"code":..,"message":..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The error payload.
    pub error: ErrorMessage,
}

impl ErrorResponse {
    /// Create an envelope for the given status and message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorMessage {
                code: status.as_u16(),
                message: message.into(),
            },
        }
    }
}

/// Write the error envelope with `status` and log the failure.
///
/// The log record is emitted even if encoding the body fails; an encoding
/// failure is logged on its own and leaves the status untouched.
pub fn respond_with_error(status: StatusCode, message: &str) -> Response {
    info!(code = status.as_u16(), reason = message, "unable to serve");

    let body = ErrorResponse::new(status, message);
    match serde_json::to_vec(&body) {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], bytes).into_response(),
        Err(err) => {
            error!(error = %err, "encoding JSON response");
            (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)]).into_response()
        }
    }
}

/// Serialize `value` as a successful JSON response.
///
/// Encoding failures are logged only; the response keeps its success status
/// with an empty body.
pub fn serve_as_json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], bytes).into_response(),
        Err(err) => {
            error!(error = %err, "encoding JSON response");
            [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)].into_response()
        }
    }
}

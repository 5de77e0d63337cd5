//! Built-in module serving JSON documents from a local directory.
//!
//! Each `*.json` file in the directory becomes one child in the module's
//! navigation section; requesting `{prefix}/{name}` returns the parsed
//! contents of `{name}.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;
use tracing::debug;

use crate::module::{ContentHandler, ContentRequest, Module, ModuleError, RequestContext};
use crate::navigation::Navigation;

/// Content path the module registers under.
pub const LOCAL_CONTENT_PATH: &str = "local";

const JSON_EXTENSION: &str = "json";

/// Serves JSON files from `root`.
#[derive(Debug, Clone)]
pub struct LocalContent {
    root: PathBuf,
}

impl LocalContent {
    /// Serve the documents found in `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory being served.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Module for LocalContent {
    fn content_path(&self) -> &str {
        LOCAL_CONTENT_PATH
    }

    async fn navigation(
        &self,
        ctx: &RequestContext,
        _namespace: &str,
        content_path: &str,
    ) -> Result<Navigation, ModuleError> {
        let names = document_names(&self.root).await?;
        if ctx.is_cancelled() {
            return Err(ModuleError::Cancelled);
        }

        let children = names
            .into_iter()
            .map(|name| Navigation::new(name.clone(), format!("{content_path}/{name}")));
        Ok(Navigation::new("Local Contents", content_path).with_children(children))
    }

    fn content_handler(&self, prefix: &str) -> Result<Arc<dyn ContentHandler>, ModuleError> {
        if !self.root.is_dir() {
            return Err(ModuleError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        debug!(prefix, root = %self.root.display(), "serving local content");
        Ok(Arc::new(LocalContentHandler {
            root: self.root.clone(),
        }))
    }
}

struct LocalContentHandler {
    root: PathBuf,
}

#[async_trait]
impl ContentHandler for LocalContentHandler {
    async fn content(
        &self,
        ctx: &RequestContext,
        request: ContentRequest,
    ) -> Result<serde_json::Value, ModuleError> {
        if request.method != Method::GET {
            return Err(ModuleError::InvalidRequest(format!(
                "method {} not supported",
                request.method
            )));
        }

        if request.path.is_empty() {
            let names = document_names(&self.root).await?;
            return Ok(serde_json::json!({ "title": "Local Contents", "contents": names }));
        }

        let name = request.path.as_str();
        if name.contains('/') || name.starts_with('.') {
            return Err(ModuleError::NotFound(name.to_string()));
        }

        let file = self.root.join(format!("{name}.{JSON_EXTENSION}"));
        let data = match tokio::fs::read(&file).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ModuleError::NotFound(name.to_string()));
            }
            Err(e) => return Err(ModuleError::Internal(format!("reading {name}: {e}"))),
        };
        if ctx.is_cancelled() {
            return Err(ModuleError::Cancelled);
        }

        serde_json::from_slice(&data)
            .map_err(|e| ModuleError::Internal(format!("decoding {name}: {e}")))
    }
}

/// Sorted stems of the `*.json` files in `root`.
async fn document_names(root: &Path) -> Result<Vec<String>, ModuleError> {
    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(|e| ModuleError::Unavailable(format!("{}: {e}", root.display())))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ModuleError::Internal(e.to_string()))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(JSON_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

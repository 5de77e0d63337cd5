//! Module registry.
//!
//! Modules are registered on a [`RegistryBuilder`] during startup. Calling
//! [`RegistryBuilder::build`] consumes the builder and yields an immutable
//! [`ModuleRegistry`] snapshot that is shared, lock-free, by every request.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::module::Module;

/// Root segment every module's content prefix lives under.
pub const CONTENT_ROOT: &str = "/content";

/// Errors returned by [`RegistryBuilder::register`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Another module already owns this prefix.
    #[error("content path {0} is already registered")]
    DuplicatePrefix(String),

    /// The module's content path resolves to the content root itself.
    #[error("content path {0:?} does not name a segment under {CONTENT_ROOT}")]
    EmptyContentPath(String),
}

/// Join `CONTENT_ROOT` with a module's content path.
///
/// Duplicate slashes and `.` segments are dropped and `..` pops a segment,
/// but never past the content root.
#[must_use]
pub fn content_prefix(content_path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in content_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut prefix = String::from(CONTENT_ROOT);
    for segment in segments {
        prefix.push('/');
        prefix.push_str(segment);
    }
    prefix
}

/// A registered module and the prefix it serves under.
#[derive(Clone)]
pub struct RegisteredModule {
    prefix: String,
    module: Arc<dyn Module>,
}

impl RegisteredModule {
    /// Full content prefix, e.g. `/content/overview`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The module itself.
    #[must_use]
    pub fn module(&self) -> &Arc<dyn Module> {
        &self.module
    }
}

impl fmt::Debug for RegisteredModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModule")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Collects modules during startup.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<RegisteredModule>,
    prefixes: HashSet<String>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module at the end of the navigation order.
    ///
    /// Returns the prefix the module will be served under. On error the
    /// builder is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePrefix`] if the computed prefix is
    /// already taken and [`RegistryError::EmptyContentPath`] if the module's
    /// content path does not name a segment.
    pub fn register(&mut self, module: Arc<dyn Module>) -> Result<String, RegistryError> {
        let prefix = content_prefix(module.content_path());
        if prefix == CONTENT_ROOT {
            return Err(RegistryError::EmptyContentPath(
                module.content_path().to_string(),
            ));
        }
        if self.prefixes.contains(&prefix) {
            return Err(RegistryError::DuplicatePrefix(prefix));
        }

        debug!(content_path = %prefix, "registering content path");
        self.prefixes.insert(prefix.clone());
        self.entries.push(RegisteredModule {
            prefix: prefix.clone(),
            module,
        });
        Ok(prefix)
    }

    /// Number of modules registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no modules have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> ModuleRegistry {
        ModuleRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable, registration-ordered set of modules.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    entries: Vec<RegisteredModule>,
}

impl ModuleRegistry {
    /// Modules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModule> {
        self.entries.iter()
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

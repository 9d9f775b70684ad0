//! Transports that fetch theme documents by name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

#[async_trait]
/// Asynchronous retrieval of raw theme documents.
pub trait ThemeSource: Send + Sync {
    /// Fetch the JSON document for `name`.
    async fn fetch(&self, name: &str) -> EngineResult<Value>;
}

/// Reads `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory searched for documents.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidThemeName`] for names that are empty or
    /// would leave the root directory.
    pub fn path_for(&self, name: &str) -> EngineResult<PathBuf> {
        let invalid = |reason| EngineError::InvalidThemeName {
            name: name.to_string(),
            reason,
        };
        if name.trim().is_empty() {
            return Err(invalid("must not be empty"));
        }
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(invalid("must not contain path separators or start with '.'"));
        }
        Ok(self.root.join(format!("{name}.json")))
    }
}

#[async_trait]
impl ThemeSource for DirectorySource {
    async fn fetch(&self, name: &str) -> EngineResult<Value> {
        let path = self.path_for(name)?;
        debug!(theme = name, path = %path.display(), "reading theme document");
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| EngineError::Source {
                operation: "source.read",
                theme: name.to_string(),
                source,
            })?;
        let value: Value =
            serde_json::from_str(&text).map_err(livery_tokens::TokenError::from)?;
        Ok(value)
    }
}

/// In-memory documents keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: BTreeMap<String, Value>,
}

impl MemorySource {
    /// Empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    #[must_use]
    pub fn with_document(mut self, name: impl Into<String>, document: Value) -> Self {
        self.documents.insert(name.into(), document);
        self
    }
}

#[async_trait]
impl ThemeSource for MemorySource {
    async fn fetch(&self, name: &str) -> EngineResult<Value> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::Source {
                operation: "source.lookup",
                theme: name.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "theme not registered"),
            })
    }
}

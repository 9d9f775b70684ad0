//! Style surfaces that receive emitted CSS.
//!
//! # Design
//! - A surface holds named style nodes; writing a node replaces its text.
//! - Nested contexts get their own surface and are fed through
//!   [`crate::ThemeEngine::mirror_into`].

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};

/// Target for emitted CSS text.
pub trait StyleSurface: Send + Sync {
    /// Replace the text of `node_id`, creating the node if absent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Surface`] when the node cannot be written.
    fn replace_style(&mut self, node_id: &str, css: &str) -> EngineResult<()>;

    /// Current text of `node_id`.
    fn style(&self, node_id: &str) -> Option<String>;
}

/// In-process surface keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    nodes: BTreeMap<String, String>,
}

impl MemorySurface {
    /// Empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of style nodes present.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl StyleSurface for MemorySurface {
    fn replace_style(&mut self, node_id: &str, css: &str) -> EngineResult<()> {
        self.nodes.insert(node_id.to_string(), css.to_string());
        Ok(())
    }

    fn style(&self, node_id: &str) -> Option<String> {
        self.nodes.get(node_id).cloned()
    }
}

/// Surface writing each node to `<dir>/<node-id>.css`.
#[derive(Debug, Clone)]
pub struct FileSurface {
    dir: PathBuf,
}

impl FileSurface {
    /// Surface rooted at `dir`; the directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the stylesheet backing `node_id`.
    #[must_use]
    pub fn path_for(&self, node_id: &str) -> PathBuf {
        self.dir.join(format!("{node_id}.css"))
    }

    /// Directory holding the stylesheets.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StyleSurface for FileSurface {
    fn replace_style(&mut self, node_id: &str, css: &str) -> EngineResult<()> {
        let surface_error = |operation, source: io::Error| EngineError::Surface {
            operation,
            node: node_id.to_string(),
            source,
        };
        if node_id.is_empty() || node_id.contains(['/', '\\']) || node_id.starts_with('.') {
            return Err(surface_error(
                "surface.node_id",
                io::Error::new(io::ErrorKind::InvalidInput, "node id is not a file name"),
            ));
        }
        fs::create_dir_all(&self.dir).map_err(|err| surface_error("surface.create_dir", err))?;
        fs::write(self.path_for(node_id), css)
            .map_err(|err| surface_error("surface.write", err))
    }

    fn style(&self, node_id: &str) -> Option<String> {
        fs::read_to_string(self.path_for(node_id)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_surface_replaces_node_text() -> EngineResult<()> {
        let mut surface = MemorySurface::new();
        surface.replace_style("livery-theme", "a")?;
        surface.replace_style("livery-theme", "b")?;
        assert_eq!(surface.node_count(), 1);
        assert_eq!(surface.style("livery-theme").as_deref(), Some("b"));
        assert_eq!(surface.style("other"), None);
        Ok(())
    }

    #[test]
    fn file_surface_writes_one_file_per_node() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut surface = FileSurface::new(dir.path().join("styles"));
        surface.replace_style("livery-theme", "first")?;
        surface.replace_style("livery-theme", "second")?;
        assert_eq!(
            std::fs::read_to_string(surface.path_for("livery-theme"))?,
            "second"
        );
        assert_eq!(std::fs::read_dir(surface.dir())?.count(), 1);
        assert!(surface.replace_style("../escape", "x").is_err());
        Ok(())
    }
}

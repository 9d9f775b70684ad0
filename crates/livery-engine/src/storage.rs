//! Durable key/value slots for the applied theme.
//!
//! # Design
//! - Backends store opaque strings; the engine owns the payload format.
//! - File writes go through a sibling temporary file and a rename so readers
//!   never observe a half-written value.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};

/// Key/value persistence used by the engine.
pub trait ThemeStorage: Send + Sync {
    /// Read the value under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the value under `key`; absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// In-process storage, optionally simulating an unavailable backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    unavailable: bool,
}

impl MemoryStorage {
    /// Empty, writable storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects every operation.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            entries: BTreeMap::new(),
            unavailable: true,
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check(&self) -> StorageResult<()> {
        if self.unavailable {
            return Err(StorageError::Unavailable {
                reason: "storage disabled",
            });
        }
        Ok(())
    }
}

impl ThemeStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.check()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            operation: "storage.create_dir",
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::Unavailable {
                reason: "storage key is not a safe file name",
            });
        }
        Ok(self.root.join(key))
    }
}

impl ThemeStorage for FileStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                operation: "storage.read",
                path,
                source,
            }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let staging = self.root.join(format!(".{key}.tmp"));
        fs::write(&staging, value).map_err(|source| StorageError::Io {
            operation: "storage.write",
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StorageError::Io {
            operation: "storage.rename",
            path,
            source,
        })
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                operation: "storage.remove",
                path,
                source,
            }),
        }
    }
}

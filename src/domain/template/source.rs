//! Read-only template sources.
//!
//! The cache resolves template and layout names through a `SourceStore`.
//! Two implementations are provided:
//! - `FsSourceStore`: files under a root directory
//! - `MemorySourceStore`: sources registered in memory (embedding, tests)

use std::path::{Component, Path, PathBuf};

use dashmap::DashMap;
use thiserror::Error;

/// Errors that can occur while reading a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No source exists under the name
    #[error("Source not found: {0}")]
    NotFound(String),

    /// The name cannot be resolved safely (absolute, or escapes the root)
    #[error("Invalid source name: {0}")]
    InvalidName(String),

    /// The source exists but could not be read
    #[error("Failed to read source {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Byte lookup by path-like name.
///
/// Implementations must be thread-safe (`Send + Sync`); the cache calls
/// `read` from whichever caller misses first.
pub trait SourceStore: Send + Sync {
    /// Read the raw bytes stored under `name`.
    fn read(&self, name: &str) -> Result<Vec<u8>, SourceError>;
}

/// Sources stored as files below a root directory.
#[derive(Debug, Clone)]
pub struct FsSourceStore {
    root: PathBuf,
}

impl FsSourceStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, SourceError> {
        let path = Path::new(name);
        let relative = !name.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !relative {
            return Err(SourceError::InvalidName(name.to_string()));
        }

        Ok(self.root.join(path))
    }
}

impl SourceStore for FsSourceStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        let path = self.resolve(name)?;

        std::fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(name.to_string())
            } else {
                SourceError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }
}

/// In-memory sources.
#[derive(Debug, Default)]
pub struct MemorySourceStore {
    sources: DashMap<String, Vec<u8>>,
}

impl MemorySourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source, builder style
    pub fn with(self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(name, content);
        self
    }

    /// Register or replace a source.
    ///
    /// A name already loaded by a cache keeps its cached version.
    pub fn insert(&self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.sources.insert(name.into(), content.into());
    }

    /// Get the number of registered sources
    pub fn count(&self) -> usize {
        self.sources.len()
    }
}

impl SourceStore for MemorySourceStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        self.sources
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_reads_relative_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("welcome")).unwrap();
        std::fs::write(dir.path().join("welcome/en.md"), "Hello").unwrap();

        let store = FsSourceStore::new(dir.path());
        assert_eq!(store.read("welcome/en.md").unwrap(), b"Hello");
        assert_eq!(store.read("./welcome/en.md").unwrap(), b"Hello");
    }

    #[test]
    fn test_fs_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSourceStore::new(dir.path());
        assert!(matches!(store.read("nope.md"), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_fs_store_rejects_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSourceStore::new(dir.path());

        for name in ["../secret.md", "a/../../b.md", "/etc/passwd", ""] {
            assert!(
                matches!(store.read(name), Err(SourceError::InvalidName(_))),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_fs_store_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("folder")).unwrap();
        let store = FsSourceStore::new(dir.path());
        assert!(store.read("folder").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySourceStore::new().with("a.md", "A");
        store.insert("b.md", b"B".to_vec());

        assert_eq!(store.count(), 2);
        assert_eq!(store.read("a.md").unwrap(), b"A");
        assert_eq!(store.read("b.md").unwrap(), b"B");
        assert!(matches!(store.read("c.md"), Err(SourceError::NotFound(_))));
    }
}

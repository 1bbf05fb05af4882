//! Persistent stores for resolved content.
//!
//! The resolution cache consults a [`ContentStore`] before doing any work and
//! persists successful resolutions back into it, so completed work survives
//! across processes (or at least across cache instances).
//!
//! Built-in backends:
//!
//! - [`MemoryStore`] -- in-process map, for tests and single-process use.
//! - [`FsStore`] -- one file per key on the local filesystem.
//!
//! Implement the [`ContentStore`] trait to plug in your own backend.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::{Result, RewriteError};

/// Trait for stores that persist resolved content across cache instances.
///
/// Implementations must be `Send + Sync + 'static` so the cache can be shared
/// across tasks.
pub trait ContentStore: Send + Sync + 'static {
    /// Look up a previously persisted resolution for `key`.
    fn lookup(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Persist a resolved value under `key`.
    fn persist(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;
}

/// In-process [`ContentStore`] backed by a map.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted entries. Mostly useful in tests.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStore for MemoryStore {
    async fn lookup(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn persist(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// [`ContentStore`] that writes one file per key to the local filesystem.
///
/// Intermediate directories are created automatically; keys containing `/`
/// map to subdirectories.
///
/// # Example
///
/// ```rust,no_run
/// use content_rewriter::FsStore;
///
/// let store = FsStore::new("/var/data/resolved_content");
/// ```
pub struct FsStore {
    base_dir: PathBuf,
}

impl FsStore {
    /// Create a new `FsStore` rooted at the given directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

impl ContentStore for FsStore {
    async fn lookup(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RewriteError::Store(Box::new(e))),
        }
    }

    async fn persist(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RewriteError::Store(Box::new(e)))?;
        }

        tokio::fs::write(&path, value)
            .await
            .map_err(|e| RewriteError::Store(Box::new(e)))?;

        tracing::debug!("Persisted {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

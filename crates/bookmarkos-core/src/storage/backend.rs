//! Storage backends
//!
//! Two interchangeable key-value backends sit behind the same async
//! contract:
//!
//! - `FileBackend`: one JSON document per key under the data directory,
//!   written atomically. This is the durable store.
//! - `MemoryBackend`: a process-local map with an optional byte quota. It is
//!   synchronous underneath and used when the data directory is unusable.
//!
//! The backend is chosen once by `BackendKind::resolve` and then passed
//! down explicitly.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::persistence::atomic_write;
use crate::config::{BackendChoice, Config};

/// File used to check that the data directory accepts writes
const PROBE_FILE: &str = ".bookmarkos-probe";

/// The backend actually in use after resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Memory,
}

impl BackendKind {
    /// Resolve the configured choice into a concrete backend
    ///
    /// `Auto` picks the file backend when the data directory can be created
    /// and written, and the memory backend otherwise.
    pub fn resolve(config: &Config) -> Self {
        match config.backend {
            BackendChoice::File => BackendKind::File,
            BackendChoice::Memory => BackendKind::Memory,
            BackendChoice::Auto => {
                if probe_data_dir(&config.data_dir) {
                    BackendKind::File
                } else {
                    warn!(
                        "Data directory {:?} is not writable, falling back to in-memory storage",
                        config.data_dir
                    );
                    BackendKind::Memory
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::File => "file",
            BackendKind::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that the directory exists (or can be created) and accepts writes
fn probe_data_dir(dir: &std::path::Path) -> bool {
    if fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(PROBE_FILE);
    let ok = fs::write(&probe, b"ok").is_ok();
    let _ = fs::remove_file(&probe);
    ok
}

/// Durable backend storing each key as `<data_dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileBackend {
    config: Config,
}

impl FileBackend {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.config.key_path(key)
    }

    async fn read(&self, key: &str) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, key: &str, value: String) -> StorageResult<()> {
        atomic_write(&self.path(key), value.as_bytes()).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }
}

/// Process-local backend with an optional byte quota
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new(quota: Option<usize>) -> Self {
        Self {
            entries: Arc::default(),
            quota,
        }
    }

    /// Put a raw value in place without any checks
    ///
    /// Useful for seeding a store with data written by something else.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().insert(key.into(), value.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn write(&self, key: &str, value: String) -> StorageResult<()> {
        let mut entries = self.lock();
        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// A resolved backend, exposed through one async contract
#[derive(Debug, Clone)]
pub enum StorageBackend {
    File(FileBackend),
    Memory(MemoryBackend),
}

impl StorageBackend {
    /// Build the backend for an already-resolved kind
    pub fn open(kind: BackendKind, config: &Config) -> Self {
        debug!("Opening {} storage backend", kind);
        match kind {
            BackendKind::File => StorageBackend::File(FileBackend::new(config.clone())),
            BackendKind::Memory => {
                StorageBackend::Memory(MemoryBackend::new(config.memory_quota_bytes))
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            StorageBackend::File(_) => BackendKind::File,
            StorageBackend::Memory(_) => BackendKind::Memory,
        }
    }

    /// Read the raw serialized value for a key
    ///
    /// `Ok(None)` means the key is absent.
    pub async fn read(&self, key: &str) -> io::Result<Option<String>> {
        match self {
            StorageBackend::File(b) => b.read(key).await,
            StorageBackend::Memory(b) => Ok(b.read(key)),
        }
    }

    /// Replace the raw serialized value for a key
    pub async fn write(&self, key: &str, value: String) -> StorageResult<()> {
        match self {
            StorageBackend::File(b) => b.write(key, value).await,
            StorageBackend::Memory(b) => b.write(key, value),
        }
    }

    /// Remove a key; removing an absent key succeeds
    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        match self {
            StorageBackend::File(b) => b.remove(key).await,
            StorageBackend::Memory(b) => {
                b.remove(key);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_explicit_choices() {
        let mut config = Config::with_data_dir("/nonexistent/never");
        config.backend = BackendChoice::Memory;
        assert_eq!(BackendKind::resolve(&config), BackendKind::Memory);

        config.backend = BackendChoice::File;
        assert_eq!(BackendKind::resolve(&config), BackendKind::File);
    }

    #[test]
    fn test_resolve_auto_writable_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::with_data_dir(temp_dir.path().join("data"));

        assert_eq!(BackendKind::resolve(&config), BackendKind::File);
        assert!(temp_dir.path().join("data").exists());
        assert!(!temp_dir.path().join("data").join(PROBE_FILE).exists());
    }

    #[test]
    fn test_resolve_auto_unwritable_dir() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let config = Config::with_data_dir(blocker.join("data"));

        assert_eq!(BackendKind::resolve(&config), BackendKind::Memory);
    }

    #[tokio::test]
    async fn test_file_backend_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let backend = StorageBackend::open(
            BackendKind::File,
            &Config::with_data_dir(temp_dir.path()),
        );

        assert!(backend.read("k").await.unwrap().is_none());
        backend.write("k", "[1,2]".into()).await.unwrap();
        assert_eq!(backend.read("k").await.unwrap().as_deref(), Some("[1,2]"));
        assert!(temp_dir.path().join("k.json").exists());

        backend.remove("k").await.unwrap();
        assert!(backend.read("k").await.unwrap().is_none());
        // Removing again is fine
        backend.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_backend_roundtrip() {
        let backend = StorageBackend::open(BackendKind::Memory, &Config::default());
        assert_eq!(backend.kind(), BackendKind::Memory);

        backend.write("k", "{}".into()).await.unwrap();
        assert_eq!(backend.read("k").await.unwrap().as_deref(), Some("{}"));
        backend.remove("k").await.unwrap();
        assert!(backend.read("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_quota() {
        let memory = MemoryBackend::new(Some(20));
        let backend = StorageBackend::Memory(memory.clone());

        backend.write("a", "0123456789".into()).await.unwrap();
        let err = backend.write("b", "0123456789".into()).await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert!(backend.read("b").await.unwrap().is_none());

        // Overwriting a key only counts its new size
        backend.write("a", "012345678901234".into()).await.unwrap();
    }

    #[test]
    fn test_memory_clones_share_entries() {
        let memory = MemoryBackend::new(None);
        let other = memory.clone();
        memory.insert_raw("k", "v");
        assert_eq!(other.read("k").as_deref(), Some("v"));
    }
}

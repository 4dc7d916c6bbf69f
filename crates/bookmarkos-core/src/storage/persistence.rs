//! Key-value persistence
//!
//! `KeyValueStore` is the single facade over the resolved backend. It turns
//! raw stored strings into typed values and owns the failure policy:
//!
//! - Reads never fail. A missing key is `Loaded::Missing`; an unreadable or
//!   unparseable value is `Loaded::Corrupt`, logged, and treated as absent by
//!   callers that want a default.
//! - Writes return `StorageError` so callers can report that nothing was
//!   persisted.
//!
//! Storage location for the file backend: `~/.local/share/bookmarkos/`
//! (configurable via `Config`).
//!
//! Files:
//! - `bookmarkos_bookmarks.json` - The bookmark collection, newest first
//! - `bookmarkos_settings.json` - The settings record

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::backend::{BackendKind, StorageBackend};
use super::error::{StorageError, StorageResult};

/// Key holding the bookmark collection
pub const BOOKMARKS_KEY: &str = "bookmarkos_bookmarks";

/// Key holding the settings record
pub const SETTINGS_KEY: &str = "bookmarkos_settings";

/// Outcome of reading a key
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// A value was stored and parsed
    Present(T),
    /// Nothing is stored under the key
    Missing,
    /// Something is stored but could not be read or parsed
    Corrupt { details: String },
}

impl<T> Loaded<T> {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Loaded::Corrupt { .. })
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Loaded::Present(value) => Some(value),
            _ => None,
        }
    }

    /// The stored value, or a fallback for missing and corrupt data
    pub fn unwrap_or_else(self, fallback: impl FnOnce() -> T) -> T {
        self.into_option().unwrap_or_else(fallback)
    }
}

impl<T: Default> Loaded<T> {
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

/// Typed access to the resolved backend
///
/// Clones share the backend and the writer lock.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    backend: StorageBackend,
    writer: Arc<Mutex<()>>,
}

impl KeyValueStore {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Take the writer lock
    ///
    /// Every read-modify-write sequence holds this for its duration so that
    /// overlapping mutations from one process are applied one after another.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Read and parse the value stored under `key`
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Loaded<T> {
        let raw = match self.backend.read(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Loaded::Missing,
            Err(e) => {
                warn!("Failed to read '{}', treating as empty: {}", key, e);
                return Loaded::Corrupt {
                    details: e.to_string(),
                };
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Loaded::Present(value),
            Err(e) => {
                warn!("Stored value for '{}' is corrupt, treating as empty: {}", key, e);
                Loaded::Corrupt {
                    details: e.to_string(),
                }
            }
        }
    }

    /// Read a value, falling back to its default when missing or corrupt
    pub async fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read(key).await.unwrap_or_default()
    }

    /// Serialize and store a value under `key`
    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        debug!("Writing {} bytes to '{}'", raw.len(), key);
        self.backend.write(key, raw).await.map_err(|e| {
            warn!("Write to '{}' failed: {}", key, e);
            e
        })
    }

    /// Remove a key entirely
    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        debug!("Removing '{}'", key);
        self.backend.remove(key).await
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
pub(crate) async fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    let mut file = tokio::fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    drop(file);

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|source| StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        })?;

    Ok(())
}

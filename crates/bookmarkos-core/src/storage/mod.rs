//! Storage layer
//!
//! Handles persistence of the two stored keys (bookmark collection and
//! settings record).
//!
//! ## Architecture
//!
//! - **Backends**: a durable file store or an in-memory fallback, resolved
//!   once at startup
//! - **KeyValueStore**: typed JSON reads and writes over the backend, with
//!   corrupt reads recovered as absent and write failures surfaced

pub mod backend;
pub mod error;
pub mod persistence;

pub use backend::{BackendKind, FileBackend, MemoryBackend, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use persistence::{KeyValueStore, Loaded, BOOKMARKS_KEY, SETTINGS_KEY};

//! Bookmark OS Core Library
//!
//! This crate provides the storage and query core for Bookmark OS, a
//! local bookmark manager with tagging, read tracking, and import/export.
//!
//! # Architecture
//!
//! - **Storage**: a key-value store holding two JSON documents (the bookmark
//!   collection and the settings record) on a file or in-memory backend
//! - **Repository / Settings / Transfer**: read-modify-write operations on
//!   those documents, serialized through one writer lock
//! - **Query**: pure search, filter, and sort over bookmark lists
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open()?;
//!
//! // Add a bookmark
//! let bookmark = Bookmark::new("https://example.com", "Example");
//! store.bookmarks().create(&bookmark).await?;
//!
//! // Query bookmarks
//! let options = QueryOptions { query: Some("example".into()), ..Default::default() };
//! let found = options.apply(&store.bookmarks().get_all().await);
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: The bookmark record and its parts
//! - `repository`: Bookmark CRUD
//! - `query`: Search, filter, and sort
//! - `transfer`: Import and export
//! - `settings`: The settings record
//! - `premium`: Entitlement checks for gated features
//! - `summary`: Summarization seam
//! - `storage`: Backends and typed persistence
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod premium;
pub mod query;
pub mod repository;
pub mod settings;
pub mod storage;
pub mod store;
pub mod summary;
pub mod transfer;

pub use config::{BackendChoice, Config};
pub use error::{BookmarkError, BookmarkResult};
pub use models::{Bookmark, Source, TweetCapture, TweetMetadata};
pub use premium::{Entitlements, Feature};
pub use query::{FilterPreset, QueryOptions, SortKey};
pub use repository::BookmarkRepository;
pub use settings::{SettingUpdate, Settings, SettingsStore};
pub use storage::{BackendKind, StorageError};
pub use store::Store;
pub use summary::{Retrying, Summarizer};
pub use transfer::{ExportEnvelope, ExportMeta, Transfer};

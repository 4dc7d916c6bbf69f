//! Unified storage interface
//!
//! The `Store` resolves the storage backend once and hands the same
//! `KeyValueStore` (and so the same writer lock) to the repository, the
//! settings store, and the import/export engine.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open()?;
//!
//! store.bookmarks().create(&Bookmark::new("https://example.com", "Example")).await?;
//! let unread = filter(&store.bookmarks().get_all().await, FilterPreset::Unread);
//! ```

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::error::BookmarkResult;
use crate::models::Bookmark;
use crate::premium::{Entitlements, Feature};
use crate::repository::BookmarkRepository;
use crate::settings::SettingsStore;
use crate::storage::{BackendKind, KeyValueStore, StorageBackend};
use crate::summary::{summarize_bookmark, Summarizer};
use crate::transfer::Transfer;

/// Entry point to the bookmark core
#[derive(Debug, Clone)]
pub struct Store {
    bookmarks: BookmarkRepository,
    settings: SettingsStore,
    transfer: Transfer,
    backend: BackendKind,
    config: Config,
}

impl Store {
    /// Open the store using the configuration from disk and environment
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the store with a specific configuration
    ///
    /// The backend is resolved here and stays fixed for the life of the
    /// store.
    pub fn open_with_config(config: Config) -> Result<Self> {
        let backend = BackendKind::resolve(&config);
        if backend == BackendKind::File {
            std::fs::create_dir_all(&config.data_dir).with_context(|| {
                format!("Failed to create data directory {:?}", config.data_dir)
            })?;
        }
        info!("Using {} storage backend", backend);
        Ok(Self::with_backend(StorageBackend::open(backend, &config), config))
    }

    /// A store backed only by memory, for tests and throwaway sessions
    pub fn in_memory() -> Self {
        let config = Config::default();
        Self::with_backend(StorageBackend::open(BackendKind::Memory, &config), config)
    }

    fn with_backend(backend: StorageBackend, config: Config) -> Self {
        let kind = backend.kind();
        let kv = KeyValueStore::new(backend);
        Self {
            bookmarks: BookmarkRepository::new(kv.clone()),
            settings: SettingsStore::new(kv.clone(), config.prefers_dark),
            transfer: Transfer::new(kv),
            backend: kind,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The backend chosen when the store was opened
    pub fn backend_kind(&self) -> BackendKind {
        self.backend
    }

    pub fn bookmarks(&self) -> &BookmarkRepository {
        &self.bookmarks
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn transfer(&self) -> &Transfer {
        &self.transfer
    }

    /// Current entitlements, read from settings
    pub async fn entitlements(&self) -> Entitlements {
        Entitlements::from_settings(&self.settings.get().await)
    }

    pub async fn is_premium_user(&self) -> bool {
        self.settings.is_premium_user().await
    }

    // ==================== Gated Operations ====================

    /// Interchange export; requires premium
    pub async fn export_json(&self, bookmarks: Option<&[Bookmark]>) -> BookmarkResult<String> {
        self.entitlements().await.require(Feature::JsonExport)?;
        self.transfer.export_to_interchange(bookmarks).await
    }

    /// Markdown export; requires premium
    pub async fn export_markdown(&self, bookmarks: Option<&[Bookmark]>) -> BookmarkResult<String> {
        self.entitlements().await.require(Feature::MarkdownExport)?;
        Ok(self.transfer.export_to_document(bookmarks).await)
    }

    /// Summarize a stored bookmark; requires premium
    pub async fn summarize<S: Summarizer>(&self, id: &str, summarizer: &S) -> BookmarkResult<Bookmark> {
        summarize_bookmark(&self.bookmarks, &self.settings, summarizer, id).await
    }
}

//! Bookmark repository
//!
//! CRUD over the stored bookmark collection. Every mutation is a
//! read-modify-write of the whole collection, done while holding the
//! store's writer lock. The collection is kept newest first: `create`
//! prepends.

use tracing::{debug, info};

use crate::error::{BookmarkError, BookmarkResult};
use crate::models::Bookmark;
use crate::storage::{KeyValueStore, Loaded, BOOKMARKS_KEY};

/// CRUD operations over the stored bookmark collection
#[derive(Debug, Clone)]
pub struct BookmarkRepository {
    kv: KeyValueStore,
}

impl BookmarkRepository {
    pub fn new(kv: KeyValueStore) -> Self {
        Self { kv }
    }

    /// Load the collection, distinguishing missing from corrupt data
    pub async fn load(&self) -> Loaded<Vec<Bookmark>> {
        self.kv.read(BOOKMARKS_KEY).await
    }

    /// All bookmarks, newest first
    ///
    /// Missing or corrupt data yields an empty list.
    pub async fn get_all(&self) -> Vec<Bookmark> {
        self.load().await.unwrap_or_default()
    }

    /// Look up a single bookmark
    pub async fn get(&self, id: &str) -> Option<Bookmark> {
        self.get_all().await.into_iter().find(|b| b.id == id)
    }

    pub async fn count(&self) -> usize {
        self.get_all().await.len()
    }

    /// Add a bookmark at the front of the collection
    ///
    /// The bookmark is stored as given; only the id is checked, since ids
    /// must stay unique within the collection.
    pub async fn create(&self, bookmark: &Bookmark) -> BookmarkResult<()> {
        let _guard = self.kv.lock_writes().await;

        let mut bookmarks = self.get_all().await;
        if bookmarks.iter().any(|b| b.id == bookmark.id) {
            return Err(BookmarkError::DuplicateId {
                id: bookmark.id.clone(),
            });
        }
        bookmarks.insert(0, bookmark.clone());
        self.kv.write(BOOKMARKS_KEY, &bookmarks).await?;

        info!("Created bookmark {}", bookmark.id);
        Ok(())
    }

    /// Replace the stored bookmark with the same id, keeping its position
    pub async fn update(&self, bookmark: &Bookmark) -> BookmarkResult<()> {
        self.modify(&bookmark.id, |stored| *stored = bookmark.clone())
            .await
            .map(|_| ())
    }

    /// Remove a bookmark; removing an unknown id is not an error
    pub async fn delete(&self, id: &str) -> BookmarkResult<()> {
        let _guard = self.kv.lock_writes().await;

        let mut bookmarks = self.get_all().await;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != id);
        if bookmarks.len() == before {
            debug!("Delete of unknown bookmark {} ignored", id);
        }
        self.kv.write(BOOKMARKS_KEY, &bookmarks).await?;
        Ok(())
    }

    /// Mark a bookmark read or unread
    pub async fn set_read(&self, id: &str, is_read: bool) -> BookmarkResult<Bookmark> {
        self.modify(id, |b| b.is_read = is_read).await
    }

    /// Flip a bookmark's read status
    pub async fn toggle_read(&self, id: &str) -> BookmarkResult<Bookmark> {
        self.modify(id, |b| b.is_read = !b.is_read).await
    }

    /// Store a summary verbatim (or clear it)
    pub async fn set_summary(&self, id: &str, summary: Option<String>) -> BookmarkResult<Bookmark> {
        self.modify(id, move |b| b.ai_summary = summary).await
    }

    /// Apply `change` to the bookmark with `id` and persist the collection
    async fn modify<F>(&self, id: &str, change: F) -> BookmarkResult<Bookmark>
    where
        F: FnOnce(&mut Bookmark),
    {
        let _guard = self.kv.lock_writes().await;

        let mut bookmarks = self.get_all().await;
        let stored = bookmarks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BookmarkError::NotFound { id: id.to_string() })?;
        change(stored);
        let updated = stored.clone();

        self.kv.write(BOOKMARKS_KEY, &bookmarks).await?;
        debug!("Updated bookmark {}", id);
        Ok(updated)
    }
}

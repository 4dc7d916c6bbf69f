//! Import and export
//!
//! Two formats leave the store:
//!
//! - The interchange format: pretty-printed JSON with a `bookmarks` array and
//!   a `meta` envelope (`exportDate`, `version`, `count`). It is also the
//!   only format accepted by import.
//! - The document format: a Markdown rendering for reading, not for
//!   re-import.
//!
//! Import merges by URL: incoming bookmarks whose URL is already stored are
//! dropped, the rest are placed ahead of the existing collection.

use std::collections::HashSet;
use std::fmt::{Display, Write};

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BookmarkError, BookmarkResult};
use crate::models::Bookmark;
use crate::storage::{KeyValueStore, StorageError, BOOKMARKS_KEY};

/// Interchange format version written on export
pub const FORMAT_VERSION: &str = "1.0";

/// Metadata wrapped around exported bookmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub count: usize,
}

/// The interchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub bookmarks: Vec<Bookmark>,
    pub meta: ExportMeta,
}

impl ExportEnvelope {
    pub fn new(bookmarks: Vec<Bookmark>, export_date: DateTime<Utc>) -> Self {
        let count = bookmarks.len();
        Self {
            bookmarks,
            meta: ExportMeta {
                export_date,
                version: FORMAT_VERSION.to_string(),
                count,
            },
        }
    }
}

/// Bulk import, export, and clearing of the bookmark collection
#[derive(Debug, Clone)]
pub struct Transfer {
    kv: KeyValueStore,
}

impl Transfer {
    pub fn new(kv: KeyValueStore) -> Self {
        Self { kv }
    }

    /// Merge `incoming` into the stored collection
    ///
    /// Returns how many bookmarks were actually added. Bookmarks whose URL
    /// is already stored are dropped silently. So are bookmarks whose id is
    /// already taken, since ids must stay unique.
    pub async fn import_bookmarks(&self, incoming: Vec<Bookmark>) -> BookmarkResult<usize> {
        let _guard = self.kv.lock_writes().await;

        let existing: Vec<Bookmark> = self.kv.read_or_default(BOOKMARKS_KEY).await;
        let known_urls: HashSet<&str> = existing.iter().map(|b| b.url.as_str()).collect();
        let mut taken_ids: HashSet<String> = existing.iter().map(|b| b.id.clone()).collect();

        let offered = incoming.len();
        let mut added = Vec::with_capacity(offered);
        for bookmark in incoming {
            if known_urls.contains(bookmark.url.as_str()) {
                continue;
            }
            if !taken_ids.insert(bookmark.id.clone()) {
                warn!("Skipping imported bookmark with duplicate id {}", bookmark.id);
                continue;
            }
            added.push(bookmark);
        }

        let count = added.len();
        if count > 0 {
            added.extend(existing);
            self.kv.write(BOOKMARKS_KEY, &added).await?;
        }

        info!("Imported {} of {} bookmarks", count, offered);
        Ok(count)
    }

    /// Import from interchange text
    ///
    /// Only the `bookmarks` array is required; `meta` is ignored. Nothing is
    /// written unless the whole payload parses.
    pub async fn import_from_interchange(&self, text: &str) -> BookmarkResult<usize> {
        let incoming = parse_interchange(text)?;
        self.import_bookmarks(incoming).await
    }

    /// Export as interchange text
    ///
    /// Exports the whole stored collection when `bookmarks` is `None`.
    pub async fn export_to_interchange(&self, bookmarks: Option<&[Bookmark]>) -> BookmarkResult<String> {
        let bookmarks = self.resolve(bookmarks).await;
        let envelope = ExportEnvelope::new(bookmarks, Utc::now());
        to_pretty_json(&envelope)
    }

    /// Export as a Markdown document stamped with the current local time
    pub async fn export_to_document(&self, bookmarks: Option<&[Bookmark]>) -> String {
        let bookmarks = self.resolve(bookmarks).await;
        render_markdown(&bookmarks, &Local::now())
    }

    /// Delete the entire stored collection
    pub async fn clear_all(&self) -> BookmarkResult<()> {
        let _guard = self.kv.lock_writes().await;
        self.kv.remove(BOOKMARKS_KEY).await?;
        info!("Cleared all bookmarks");
        Ok(())
    }

    async fn resolve(&self, bookmarks: Option<&[Bookmark]>) -> Vec<Bookmark> {
        match bookmarks {
            Some(bookmarks) => bookmarks.to_vec(),
            None => self.kv.read_or_default(BOOKMARKS_KEY).await,
        }
    }
}

/// Pull the bookmark records out of interchange text
pub fn parse_interchange(text: &str) -> BookmarkResult<Vec<Bookmark>> {
    let mut data: serde_json::Value =
        serde_json::from_str(text).map_err(|e| BookmarkError::InvalidFormat(e.to_string()))?;

    let records = match data.get_mut("bookmarks").map(serde_json::Value::take) {
        Some(records @ serde_json::Value::Array(_)) => records,
        Some(_) => {
            return Err(BookmarkError::InvalidFormat(
                "'bookmarks' must be an array".into(),
            ))
        }
        None => {
            return Err(BookmarkError::InvalidFormat(
                "missing 'bookmarks' array".into(),
            ))
        }
    };

    serde_json::from_value(records).map_err(|e| BookmarkError::InvalidFormat(e.to_string()))
}

/// Render bookmarks as a Markdown document
///
/// Timestamps are shown in the time zone of `exported_at`. Sections follow
/// the order of `bookmarks`.
pub fn render_markdown<Tz>(bookmarks: &[Bookmark], exported_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut doc = String::from("# Bookmark OS Export\n\n");
    let _ = write!(
        doc,
        "*Exported on {} at {}*\n\n",
        exported_at.format("%Y-%m-%d"),
        exported_at.format("%H:%M:%S")
    );

    let tz = exported_at.timezone();
    for bookmark in bookmarks {
        let _ = write!(doc, "## [{}]({})\n\n", bookmark.title, bookmark.url);

        if !bookmark.tags.is_empty() {
            let tags: Vec<String> = bookmark.tags.iter().map(|t| format!("`{}`", t)).collect();
            let _ = write!(doc, "**Tags:** {}\n\n", tags.join(", "));
        }

        if let Some(notes) = bookmark.notes_text() {
            let _ = write!(doc, "**Notes:**\n\n{}\n\n", notes);
        }

        if let Some(summary) = bookmark.summary_text() {
            let _ = write!(doc, "**AI Summary:**\n\n> {}\n\n", summary);
        }

        let added = bookmark.created_at.with_timezone(&tz);
        let _ = writeln!(doc, "**Added:** {}", added.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(doc, "**Source:** {}", bookmark.source);
        let _ = write!(
            doc,
            "**Status:** {}\n\n",
            if bookmark.is_read { "Read" } else { "Unread" }
        );

        doc.push_str("---\n\n");
    }

    doc
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> BookmarkResult<String> {
    serde_json::to_string_pretty(value).map_err(|source| {
        StorageError::Serialize {
            key: BOOKMARKS_KEY.to_string(),
            source,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use crate::storage::{MemoryBackend, StorageBackend};

    fn transfer() -> Transfer {
        Transfer::new(KeyValueStore::new(StorageBackend::Memory(
            MemoryBackend::new(None),
        )))
    }

    fn bookmark(id: &str, url: &str) -> Bookmark {
        Bookmark::with_id(id, url, format!("Title {}", id))
    }

    async fn stored(transfer: &Transfer) -> Vec<Bookmark> {
        transfer.kv.read_or_default(BOOKMARKS_KEY).await
    }

    #[tokio::test]
    async fn test_import_drops_known_urls() {
        let transfer = transfer();
        transfer
            .import_bookmarks(vec![bookmark("a", "https://a.com"), bookmark("b", "https://b.com")])
            .await
            .unwrap();

        let count = transfer
            .import_bookmarks(vec![bookmark("c", "https://b.com"), bookmark("d", "https://d.com")])
            .await
            .unwrap();

        assert_eq!(count, 1);
        let ids: Vec<String> = stored(&transfer).await.into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["d", "a", "b"]);
    }

    #[tokio::test]
    async fn test_import_url_match_is_exact() {
        let transfer = transfer();
        transfer
            .import_bookmarks(vec![bookmark("a", "https://a.com")])
            .await
            .unwrap();

        let count = transfer
            .import_bookmarks(vec![
                bookmark("b", "https://a.com/"),
                bookmark("c", "HTTPS://A.COM"),
            ])
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_import_skips_taken_ids() {
        let transfer = transfer();
        transfer
            .import_bookmarks(vec![bookmark("a", "https://a.com")])
            .await
            .unwrap();

        let count = transfer
            .import_bookmarks(vec![
                bookmark("a", "https://other.com"),
                bookmark("x", "https://x.com"),
                bookmark("x", "https://y.com"),
            ])
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(stored(&transfer).await.len(), 2);
    }

    #[tokio::test]
    async fn test_import_from_interchange() {
        let transfer = transfer();
        transfer
            .import_bookmarks(vec![bookmark("1", "https://a.com"), bookmark("2", "https://b.com")])
            .await
            .unwrap();

        let text = r#"{"bookmarks": [
            {"id": "3", "url": "https://a.com", "title": "Dup", "createdAt": "2024-01-01T00:00:00Z"},
            {"id": "4", "url": "https://c.com", "title": "New", "createdAt": "2024-01-02T00:00:00Z",
             "tags": ["x"], "source": "twitter"}
        ]}"#;
        let count = transfer.import_from_interchange(text).await.unwrap();

        assert_eq!(count, 1);
        let all = stored(&transfer).await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, "4");
        assert_eq!(all[0].source, Source::Twitter);
        assert!(!all[0].is_read);
    }

    #[tokio::test]
    async fn test_import_rejects_bad_shapes() {
        let transfer = transfer();
        transfer
            .import_bookmarks(vec![bookmark("1", "https://a.com")])
            .await
            .unwrap();

        for text in [
            "not json",
            r#"{"items": []}"#,
            r#"{"bookmarks": "nope"}"#,
            r#"{"bookmarks": [{"url": "missing everything else"}]}"#,
            "[]",
        ] {
            let err = transfer.import_from_interchange(text).await.unwrap_err();
            assert!(
                matches!(err, BookmarkError::InvalidFormat(_)),
                "expected format error for {}",
                text
            );
        }
        assert_eq!(stored(&transfer).await.len(), 1);
    }

    #[tokio::test]
    async fn test_export_interchange_envelope() {
        let transfer = transfer();
        transfer
            .import_bookmarks(vec![bookmark("1", "https://a.com"), bookmark("2", "https://b.com")])
            .await
            .unwrap();

        let text = transfer.export_to_interchange(None).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["meta"]["version"], "1.0");
        assert_eq!(json["meta"]["count"], 2);
        assert!(json["meta"]["exportDate"].is_string());
        assert!(json["bookmarks"][0]["createdAt"].is_string());

        // Exported text imports back into an empty store
        let other = self::transfer();
        assert_eq!(other.import_from_interchange(&text).await.unwrap(), 2);
        // Importing it again adds nothing
        assert_eq!(transfer.import_from_interchange(&text).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_export_given_subset() {
        let transfer = transfer();
        let subset = vec![bookmark("9", "https://z.com")];
        let text = transfer.export_to_interchange(Some(&subset)).await.unwrap();

        let envelope: ExportEnvelope = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope.meta.count, 1);
        assert_eq!(envelope.bookmarks, subset);
    }

    #[tokio::test]
    async fn test_export_empty_collection() {
        let transfer = transfer();

        let text = transfer.export_to_interchange(None).await.unwrap();
        let envelope: ExportEnvelope = serde_json::from_str(&text).unwrap();
        assert!(envelope.bookmarks.is_empty());
        assert_eq!(envelope.meta.count, 0);

        let doc = transfer.export_to_document(None).await;
        assert!(doc.starts_with("# Bookmark OS Export"));
        assert!(!doc.contains("---"));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let transfer = transfer();
        transfer
            .import_bookmarks(vec![bookmark("1", "https://a.com")])
            .await
            .unwrap();

        transfer.clear_all().await.unwrap();
        assert!(stored(&transfer).await.is_empty());
        transfer.clear_all().await.unwrap();
    }

    #[test]
    fn test_render_markdown() {
        let exported_at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

        let mut full = bookmark("1", "https://a.com");
        full.title = "Rust".into();
        full.tags = vec!["lang".into(), "systems".into()];
        full.notes = Some("Read the book".into());
        full.ai_summary = Some("A language".into());
        full.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        full.is_read = true;

        let mut bare = bookmark("2", "https://b.com");
        bare.title = "Bare".into();
        bare.created_at = Utc.with_ymd_and_hms(2024, 5, 2, 11, 30, 0).unwrap();
        bare.source = Source::ContextMenu;

        let doc = render_markdown(&[full, bare], &exported_at);
        let expected = "# Bookmark OS Export\n\n\
            *Exported on 2024-05-06 at 07:08:09*\n\n\
            ## [Rust](https://a.com)\n\n\
            **Tags:** `lang`, `systems`\n\n\
            **Notes:**\n\nRead the book\n\n\
            **AI Summary:**\n\n> A language\n\n\
            **Added:** 2024-05-01 10:00:00\n\
            **Source:** manual\n\
            **Status:** Read\n\n\
            ---\n\n\
            ## [Bare](https://b.com)\n\n\
            **Added:** 2024-05-02 11:30:00\n\
            **Source:** contextMenu\n\
            **Status:** Unread\n\n\
            ---\n\n";
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_export_encoding_failure_is_storage_error() {
        let mut unencodable = std::collections::HashMap::new();
        unencodable.insert((1, 2), "tuple keys are not valid JSON object keys");

        let err = to_pretty_json(&unencodable).unwrap_err();
        assert!(matches!(
            err,
            BookmarkError::Storage(StorageError::Serialize { .. })
        ));
    }
}

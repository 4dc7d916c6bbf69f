//! Summaries for saved bookmarks
//!
//! The summarization service itself lives outside this crate; it plugs in
//! through the `Summarizer` trait. Whatever it returns is stored verbatim
//! as the bookmark's `aiSummary`.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{BookmarkError, BookmarkResult};
use crate::models::Bookmark;
use crate::premium::{Entitlements, Feature};
use crate::repository::BookmarkRepository;
use crate::settings::SettingsStore;

/// Content shorter than this (in characters) is not sent for summarizing
pub const MIN_SUMMARY_CHARS: usize = 50;

/// Stored in place of a summary when the content is too short
pub const TOO_SHORT_SUMMARY: &str = "Tweet is too short to summarize";

/// A service that turns bookmark text into a short summary
///
/// Each call is a single attempt. Wrap an implementation in [`Retrying`]
/// to retry transient failures.
pub trait Summarizer {
    fn summarize(&self, content: &str) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// Retries a summarizer with exponential backoff
///
/// Defaults to 3 attempts with a 1 second initial delay that doubles after
/// each failure. The last error is returned once attempts run out.
pub struct Retrying<S> {
    inner: S,
    max_attempts: u32,
    initial_delay: Duration,
}

impl<S> Retrying<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }
}

impl<S: Summarizer + Sync> Summarizer for Retrying<S> {
    async fn summarize(&self, content: &str) -> anyhow::Result<String> {
        let mut delay = self.initial_delay;
        let mut attempt = 1;
        loop {
            match self.inner.summarize(content).await {
                Ok(summary) => return Ok(summary),
                Err(e) if attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    debug!(
                        "Summarize attempt {}/{} failed: {:#}",
                        attempt, self.max_attempts, e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }
}

/// The text a summary is generated from
///
/// Captured post content when present, otherwise notes, otherwise the title.
pub fn summary_source(bookmark: &Bookmark) -> &str {
    bookmark
        .metadata
        .as_ref()
        .and_then(|m| m.tweet_content.as_deref())
        .filter(|c| !c.trim().is_empty())
        .or_else(|| bookmark.notes_text())
        .unwrap_or(bookmark.title.as_str())
}

/// Summarize one stored bookmark and save the result on it
///
/// Requires premium. Content under `MIN_SUMMARY_CHARS` gets
/// `TOO_SHORT_SUMMARY` without calling the summarizer.
pub async fn summarize_bookmark<S: Summarizer>(
    bookmarks: &BookmarkRepository,
    settings: &SettingsStore,
    summarizer: &S,
    id: &str,
) -> BookmarkResult<Bookmark> {
    Entitlements::from_settings(&settings.get().await).require(Feature::AiSummary)?;

    let bookmark = bookmarks
        .get(id)
        .await
        .ok_or_else(|| BookmarkError::NotFound { id: id.to_string() })?;

    let content = summary_source(&bookmark);
    let summary = if content.chars().count() < MIN_SUMMARY_CHARS {
        debug!("Content of {} too short to summarize", id);
        TOO_SHORT_SUMMARY.to_string()
    } else {
        summarizer.summarize(content).await.map_err(|e| {
            warn!("Summarizer failed for {}: {:#}", id, e);
            BookmarkError::Summary(format!("{:#}", e))
        })?
    };

    bookmarks.set_summary(id, Some(summary)).await
}

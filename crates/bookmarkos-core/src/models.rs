//! Data models for Bookmark OS
//!
//! Defines the central `Bookmark` record and the values it carries.
//! Field names serialize in camelCase so stored collections and exported
//! interchange files share one JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BookmarkError, BookmarkResult};

/// Title used for bookmarks captured from a link's context menu
pub const CONTEXT_MENU_TITLE: &str = "Tweet from Twitter";

/// Tag attached to everything captured from the social-media page
pub const TWITTER_TAG: &str = "twitter";

/// Number of tweet characters kept in a scraped bookmark's title
const TWEET_TITLE_CHARS: usize = 60;

/// Where a bookmark came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    /// Entered by hand
    #[default]
    Manual,
    /// Scraped from the social-media bookmarks page
    Twitter,
    /// Saved from a link's context menu
    ContextMenu,
}

impl Source {
    /// Serialized name, also used as the sort key
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Manual => "manual",
            Source::Twitter => "twitter",
            Source::ContextMenu => "contextMenu",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra data kept for scraped bookmarks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetMetadata {
    /// Display name of the author
    #[serde(default)]
    pub author_name: Option<String>,
    /// Full text of the captured post
    #[serde(default)]
    pub tweet_content: Option<String>,
    /// Original timestamp as reported by the page
    #[serde(default)]
    pub tweet_date: Option<String>,
    /// Whether the post is part of a thread
    #[serde(default)]
    pub is_thread: bool,
}

/// A post extracted by the page scraper, before it becomes a bookmark
#[derive(Debug, Clone, PartialEq)]
pub struct TweetCapture {
    pub url: String,
    pub author_name: String,
    pub text: String,
    pub timestamp: Option<String>,
    pub is_thread: bool,
}

/// A saved bookmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// Opaque unique identifier, assigned by whoever creates the bookmark
    pub id: String,
    /// The bookmarked address
    pub url: String,
    /// Human-readable label
    pub title: String,
    /// Tags for organization
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-text annotation
    #[serde(default)]
    pub notes: Option<String>,
    /// When this bookmark was created
    pub created_at: DateTime<Utc>,
    /// Whether the bookmark has been read
    #[serde(default)]
    pub is_read: bool,
    /// Where the bookmark came from
    #[serde(default)]
    pub source: Source,
    /// Summary produced by the summarization service
    #[serde(default)]
    pub ai_summary: Option<String>,
    /// Present only for scraped bookmarks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TweetMetadata>,
}

impl Bookmark {
    /// Create a manual bookmark with a fresh id
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_id(generate_id(), url, title)
    }

    /// Create a bookmark with a specific id
    pub fn with_id(id: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
            tags: Vec::new(),
            notes: None,
            created_at: Utc::now(),
            is_read: false,
            source: Source::Manual,
            ai_summary: None,
            metadata: None,
        }
    }

    /// Bookmark saved from a link's context menu
    pub fn from_context_menu(url: impl Into<String>) -> Self {
        let mut bookmark = Self::new(url, CONTEXT_MENU_TITLE);
        bookmark.tags = vec![TWITTER_TAG.to_string()];
        bookmark.source = Source::ContextMenu;
        bookmark
    }

    /// Bookmark built from a post captured by the page scraper
    pub fn from_tweet(capture: TweetCapture) -> Self {
        let text = capture.text.trim();
        let mut excerpt: String = text.chars().take(TWEET_TITLE_CHARS).collect();
        if text.chars().count() > TWEET_TITLE_CHARS {
            excerpt.push_str("...");
        }
        let title = format!("{}: {}", capture.author_name, excerpt);

        let mut bookmark = Self::new(capture.url, title);
        bookmark.tags = vec![TWITTER_TAG.to_string()];
        bookmark.source = Source::Twitter;
        bookmark.metadata = Some(TweetMetadata {
            author_name: Some(capture.author_name),
            tweet_content: Some(text.to_string()),
            tweet_date: capture.timestamp,
            is_thread: capture.is_thread,
        });
        bookmark
    }

    /// Set notes, treating blank input as no notes
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
    }

    /// Replace tags with a normalized copy
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
    }

    /// Notes, if any non-empty text is present
    pub fn notes_text(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }

    /// Summary, if any non-empty text is present
    pub fn summary_text(&self) -> Option<&str> {
        self.ai_summary.as_deref().filter(|s| !s.is_empty())
    }

    /// Check the fields a form would require before saving
    ///
    /// The repository does not call this; it is for whoever builds the
    /// bookmark.
    pub fn validate(&self) -> BookmarkResult<()> {
        if self.url.trim().is_empty() {
            return Err(BookmarkError::InvalidBookmark("URL is required".into()));
        }
        if self.title.trim().is_empty() {
            return Err(BookmarkError::InvalidBookmark("title is required".into()));
        }
        if self.id.is_empty() {
            return Err(BookmarkError::InvalidBookmark("id is required".into()));
        }
        Ok(())
    }
}

/// Generate a bookmark id: millisecond timestamp plus a short random suffix
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &suffix[..7])
}

/// Trim tags, drop blanks, and drop repeats while keeping first-seen order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !seen.iter().any(|t: &String| t == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

/// Split comma-separated tag input into normalized tags
pub fn parse_tag_list(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

//! Search, filter, and sort over in-memory bookmark lists
//!
//! Everything here is pure: each function borrows a slice and returns a new
//! `Vec`, so the three steps compose in any order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Local, LocalResult, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::Bookmark;

/// Named preset filters
///
/// Deserialization goes through [`FilterPreset::parse`], so a stored value
/// this build does not know reads as `All` instead of failing the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FilterPreset {
    #[default]
    All,
    Unread,
    Today,
}

impl FilterPreset {
    /// Parse a preset name; unknown names mean `All`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "unread" => FilterPreset::Unread,
            "today" => FilterPreset::Today,
            _ => FilterPreset::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterPreset::All => "all",
            FilterPreset::Unread => "unread",
            FilterPreset::Today => "today",
        }
    }
}

impl From<String> for FilterPreset {
    fn from(name: String) -> Self {
        FilterPreset::parse(&name)
    }
}

impl std::fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    CreatedAt,
    Title,
    Source,
}

impl SortKey {
    /// Parse a sort key; unknown names mean `CreatedAt`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "date" | "createdat" | "created_at" => SortKey::CreatedAt,
            "title" => SortKey::Title,
            "source" => SortKey::Source,
            _ => SortKey::CreatedAt,
        }
    }

    fn compare(&self, a: &Bookmark, b: &Bookmark) -> Ordering {
        match self {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Title => compare_titles(&a.title, &b.title),
            SortKey::Source => a.source.as_str().cmp(b.source.as_str()),
        }
    }
}

/// Case-insensitive title comparison that orders accented letters with
/// their base letter
///
/// Titles are compared with accents folded first; accents only break ties
/// after that. Titles differing only in case are equal.
fn compare_titles(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    fold_accents(&a)
        .cmp(&fold_accents(&b))
        .then_with(|| a.nfd().cmp(b.nfd()))
}

fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Keep bookmarks where any text field contains `query`, ignoring case
///
/// An empty query returns the input unchanged.
pub fn search(bookmarks: &[Bookmark], query: &str) -> Vec<Bookmark> {
    if query.is_empty() {
        return bookmarks.to_vec();
    }

    let needle = query.to_lowercase();
    bookmarks
        .iter()
        .filter(|b| matches_query(b, &needle))
        .cloned()
        .collect()
}

fn matches_query(bookmark: &Bookmark, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(bookmark.title.as_str())
        || contains(bookmark.url.as_str())
        || bookmark.notes.as_deref().is_some_and(contains)
        || bookmark.tags.iter().any(|t| contains(t.as_str()))
        || bookmark.ai_summary.as_deref().is_some_and(contains)
}

/// Apply a preset filter relative to the current local time
pub fn filter(bookmarks: &[Bookmark], preset: FilterPreset) -> Vec<Bookmark> {
    filter_as_of(bookmarks, preset, Local::now())
}

/// Apply a preset filter relative to `now`
///
/// `Today` keeps bookmarks created at or after local midnight of `now`'s day.
pub fn filter_as_of<Tz: TimeZone>(
    bookmarks: &[Bookmark],
    preset: FilterPreset,
    now: DateTime<Tz>,
) -> Vec<Bookmark> {
    match preset {
        FilterPreset::All => bookmarks.to_vec(),
        FilterPreset::Unread => bookmarks.iter().filter(|b| !b.is_read).cloned().collect(),
        FilterPreset::Today => {
            let start = start_of_day(&now);
            bookmarks
                .iter()
                .filter(|b| b.created_at >= start)
                .cloned()
                .collect()
        }
    }
}

/// Midnight at the start of `now`'s calendar day, in `now`'s time zone
fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight skipped by a DST jump; the day starts at the jump
        LocalResult::None => tz
            .from_local_datetime(&(midnight + chrono::Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| now.with_timezone(&Utc)),
    }
}

/// Stable sort by `key`; `ascending = false` reverses the comparator
pub fn sort(bookmarks: &[Bookmark], key: SortKey, ascending: bool) -> Vec<Bookmark> {
    let mut sorted = bookmarks.to_vec();
    sorted.sort_by(|a, b| {
        let ord = key.compare(a, b);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    sorted
}

/// Search, filter, and sort in one pass
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub query: Option<String>,
    pub filter: FilterPreset,
    pub sort: SortKey,
    pub ascending: bool,
}

impl QueryOptions {
    pub fn apply(&self, bookmarks: &[Bookmark]) -> Vec<Bookmark> {
        let found = search(bookmarks, self.query.as_deref().unwrap_or(""));
        let kept = filter(&found, self.filter);
        sort(&kept, self.sort, self.ascending)
    }
}

/// Tag usage counts, sorted by tag name
pub fn collect_tags(bookmarks: &[Bookmark]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for bookmark in bookmarks {
        for tag in &bookmark.tags {
            let tag = tag.trim();
            if !tag.is_empty() {
                *counts.entry(tag).or_default() += 1;
            }
        }
    }
    counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect()
}

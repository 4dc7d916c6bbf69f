//! Errors surfaced to callers of the bookmark core
//!
//! Read failures never show up here: corrupt or unreadable stored values are
//! recovered to defaults inside the storage layer. Everything in this enum is
//! something the caller has to report to the user.

use thiserror::Error;

use crate::premium::Feature;
use crate::storage::StorageError;

/// Errors returned by repository, import/export, and settings operations
#[derive(Error, Debug)]
pub enum BookmarkError {
    /// No bookmark with the given id exists
    #[error("Bookmark not found: {id}")]
    NotFound { id: String },

    /// A bookmark with the same id is already stored
    #[error("A bookmark with id {id} already exists")]
    DuplicateId { id: String },

    /// The underlying store rejected a write
    #[error("Changes were not saved: {0}")]
    Storage(#[from] StorageError),

    /// Import payload does not have the expected shape
    #[error("Invalid bookmark JSON format: {0}")]
    InvalidFormat(String),

    /// A gated feature was used without premium entitlement
    #[error("{feature} is a premium feature")]
    PremiumRequired { feature: Feature },

    /// A settings key or value could not be understood
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// A bookmark is missing required fields
    #[error("Invalid bookmark: {0}")]
    InvalidBookmark(String),

    /// The summarization service failed
    #[error("Summary failed: {0}")]
    Summary(String),
}

impl BookmarkError {
    /// Whether the UI should offer an upgrade instead of a generic error
    pub fn is_premium_required(&self) -> bool {
        matches!(self, BookmarkError::PremiumRequired { .. })
    }

    /// Whether the error means the change was not persisted
    pub fn is_write_failure(&self) -> bool {
        matches!(self, BookmarkError::Storage(_))
    }
}

/// Result type for bookmark operations
pub type BookmarkResult<T> = Result<T, BookmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = BookmarkError::NotFound { id: "abc".into() };
        assert_eq!(err.to_string(), "Bookmark not found: abc");
        assert!(!err.is_premium_required());
    }

    #[test]
    fn test_premium_required_is_distinct() {
        let err = BookmarkError::PremiumRequired {
            feature: Feature::MarkdownExport,
        };
        assert!(err.is_premium_required());
        assert!(!err.is_write_failure());
        assert!(err.to_string().contains("premium feature"));
    }

    #[test]
    fn test_storage_error_converts() {
        let err: BookmarkError = StorageError::QuotaExceeded {
            key: "bookmarkos_bookmarks".into(),
            needed: 10,
            quota: 5,
        }
        .into();
        assert!(err.is_write_failure());
        assert!(err.to_string().contains("not saved"));
    }
}

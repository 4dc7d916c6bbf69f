//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;
use serde::Serialize;

use bookmarkos_core::{Bookmark, Settings};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single bookmark with all its fields
    pub fn print_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", bookmark.id);
                println!("Title:   {}", bookmark.title);
                println!("URL:     {}", bookmark.url);
                if !bookmark.tags.is_empty() {
                    println!("Tags:    {}", bookmark.tags.join(", "));
                }
                println!("Source:  {}", bookmark.source);
                println!("Status:  {}", read_label(bookmark));
                println!(
                    "Added:   {}",
                    bookmark
                        .created_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                );
                if let Some(ref metadata) = bookmark.metadata {
                    if let Some(ref author) = metadata.author_name {
                        println!("Author:  {}", author);
                    }
                    if metadata.is_thread {
                        println!("Thread:  yes");
                    }
                }

                if let Some(notes) = bookmark.notes_text() {
                    println!();
                    println!("── Notes ──");
                    println!("{}", notes);
                }
                if let Some(summary) = bookmark.summary_text() {
                    println!();
                    println!("── Summary ──");
                    println!("{}", summary);
                }
            }
            OutputFormat::Json => print_json(bookmark)?,
            OutputFormat::Quiet => println!("{}", bookmark.id),
        }
        Ok(())
    }

    /// Print a list of bookmarks, one per line
    pub fn print_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if bookmarks.is_empty() {
                    println!("No bookmarks found.");
                    return Ok(());
                }
                for bookmark in bookmarks {
                    let marker = if bookmark.is_read { " " } else { "*" };
                    println!(
                        "{} {} | {} | {}",
                        marker,
                        bookmark.id,
                        truncate(&bookmark.title, 35),
                        truncate(&bookmark.url, 45)
                    );
                }
                let unread = bookmarks.iter().filter(|b| !b.is_read).count();
                println!("\n{} bookmark(s), {} unread", bookmarks.len(), unread);
            }
            OutputFormat::Json => print_json(bookmarks)?,
            OutputFormat::Quiet => {
                for bookmark in bookmarks {
                    println!("{}", bookmark.id);
                }
            }
        }
        Ok(())
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[(String, usize)]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return Ok(());
                }
                for (name, count) in tags {
                    println!("{} ({})", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                print_json(&json_tags)?;
            }
            OutputFormat::Quiet => {
                for (name, _) in tags {
                    println!("{}", name);
                }
            }
        }
        Ok(())
    }

    /// Print the settings record
    pub fn print_settings(&self, settings: &Settings) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Settings:");
                println!("  darkMode:      {}", settings.dark_mode);
                println!("  defaultFilter: {}", settings.default_filter);
                println!("  isPremium:     {}", settings.is_premium);
                println!(
                    "  lastSyncDate:  {}",
                    settings
                        .last_sync_date
                        .map(|d| d.to_rfc3339())
                        .unwrap_or_else(|| "(never)".to_string())
                );
            }
            OutputFormat::Json => print_json(settings)?,
            OutputFormat::Quiet => {}
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_label(bookmark: &Bookmark) -> &'static str {
    if bookmark.is_read {
        "read"
    } else {
        "unread"
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ééééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_read_label() {
        let mut bookmark = Bookmark::new("https://a.com", "A");
        assert_eq!(read_label(&bookmark), "unread");
        bookmark.is_read = true;
        assert_eq!(read_label(&bookmark), "read");
    }
}

//! Bookmark command handlers

use anyhow::{bail, Context, Result};

use bookmarkos_core::models::parse_tag_list;
use bookmarkos_core::query::{FilterPreset, QueryOptions, SortKey};
use bookmarkos_core::{Bookmark, Store};

use crate::output::Output;
use crate::prompt::confirm;

/// Options for `list`, straight from the command line
pub struct ListArgs {
    pub search: Option<String>,
    pub filter: Option<String>,
    pub sort: String,
    pub asc: bool,
}

/// Create a new bookmark
pub async fn add(
    store: &Store,
    url: String,
    title: String,
    tags: Vec<String>,
    notes: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut bookmark = Bookmark::new(url.trim(), title.trim());
    // Tags may be given repeatedly or comma-separated
    bookmark.tags = parse_tag_list(&tags.join(","));
    bookmark.set_notes(notes);
    bookmark.validate()?;

    store
        .bookmarks()
        .create(&bookmark)
        .await
        .context("Failed to save bookmark")?;

    output.success(&format!("Added bookmark: {}", bookmark.id));
    output.print_bookmark(&bookmark)
}

/// List bookmarks through search, filter, and sort
///
/// Without `--filter` the stored default filter applies.
pub async fn list(store: &Store, args: ListArgs, output: &Output) -> Result<()> {
    let filter = match args.filter {
        Some(ref name) => FilterPreset::parse(name),
        None => store.settings().get().await.default_filter,
    };
    let options = QueryOptions {
        query: args.search,
        filter,
        sort: SortKey::parse(&args.sort),
        ascending: args.asc,
    };

    let bookmarks = options.apply(&store.bookmarks().get_all().await);
    output.print_bookmarks(&bookmarks)
}

/// Show a single bookmark
pub async fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let bookmark = resolve_bookmark(store, &id).await?;
    output.print_bookmark(&bookmark)
}

/// Mark a bookmark read or unread
pub async fn mark_read(store: &Store, id: String, is_read: bool, output: &Output) -> Result<()> {
    let bookmark = resolve_bookmark(store, &id).await?;
    let updated = store
        .bookmarks()
        .set_read(&bookmark.id, is_read)
        .await
        .context("Failed to update bookmark")?;

    output.success(&format!(
        "Marked {} as {}",
        updated.id,
        if updated.is_read { "read" } else { "unread" }
    ));
    Ok(())
}

/// Flip a bookmark's read status
pub async fn toggle(store: &Store, id: String, output: &Output) -> Result<()> {
    let bookmark = resolve_bookmark(store, &id).await?;
    let updated = store
        .bookmarks()
        .toggle_read(&bookmark.id)
        .await
        .context("Failed to update bookmark")?;

    output.success(&format!(
        "Marked {} as {}",
        updated.id,
        if updated.is_read { "read" } else { "unread" }
    ));
    Ok(())
}

/// Delete a bookmark
pub async fn delete(store: &Store, id: String, output: &Output) -> Result<()> {
    let bookmark = resolve_bookmark(store, &id).await?;

    if output.should_prompt() {
        println!("Delete bookmark: {} - {}", bookmark.id, bookmark.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .bookmarks()
        .delete(&bookmark.id)
        .await
        .context("Failed to delete bookmark")?;

    output.success(&format!("Deleted bookmark: {}", bookmark.id));
    Ok(())
}

/// Find a bookmark by full id or unique id prefix
async fn resolve_bookmark(store: &Store, id: &str) -> Result<Bookmark> {
    let bookmarks = store.bookmarks().get_all().await;
    let id = id.trim();

    if let Some(exact) = bookmarks.iter().find(|b| b.id == id) {
        return Ok(exact.clone());
    }

    let matches: Vec<&Bookmark> = bookmarks.iter().filter(|b| b.id.starts_with(id)).collect();
    match matches.as_slice() {
        [] => bail!("No bookmark found matching: {}", id),
        [only] => Ok((*only).clone()),
        _ => {
            eprintln!("Multiple bookmarks match '{}':", id);
            for bookmark in &matches {
                eprintln!("  {} - {}", bookmark.id, bookmark.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[tokio::test]
    async fn test_add_splits_comma_separated_tags() {
        let store = Store::in_memory();
        let output = Output::new(OutputFormat::Quiet);

        add(
            &store,
            "https://a.com".into(),
            "A".into(),
            vec!["rust, web".into(), "rust".into(), "cli".into()],
            None,
            &output,
        )
        .await
        .unwrap();

        let saved = store.bookmarks().get_all().await;
        assert_eq!(saved[0].tags, vec!["rust", "web", "cli"]);
    }

    #[tokio::test]
    async fn test_resolve_by_exact_and_prefix() {
        let store = Store::in_memory();
        store
            .bookmarks()
            .create(&Bookmark::with_id("abc123", "https://a.com", "A"))
            .await
            .unwrap();
        store
            .bookmarks()
            .create(&Bookmark::with_id("abd456", "https://b.com", "B"))
            .await
            .unwrap();

        assert_eq!(resolve_bookmark(&store, "abc123").await.unwrap().title, "A");
        assert_eq!(resolve_bookmark(&store, "abd").await.unwrap().title, "B");
        assert!(resolve_bookmark(&store, "ab").await.is_err());
        assert!(resolve_bookmark(&store, "zzz").await.is_err());
    }
}

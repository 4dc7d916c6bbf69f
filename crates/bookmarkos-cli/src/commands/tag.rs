//! Tag command handlers

use anyhow::Result;

use bookmarkos_core::query::collect_tags;
use bookmarkos_core::Store;

use crate::output::Output;

/// List all tags with usage counts
pub async fn list(store: &Store, output: &Output) -> Result<()> {
    let tags = collect_tags(&store.bookmarks().get_all().await);
    output.print_tags(&tags)
}

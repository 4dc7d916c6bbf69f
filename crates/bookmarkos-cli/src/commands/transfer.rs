//! Import, export, and clear handlers

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;

use bookmarkos_core::{BookmarkError, Store};

use crate::output::Output;
use crate::prompt::confirm;

/// Export formats offered on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Import bookmarks from an interchange file
pub async fn import(store: &Store, path: PathBuf, output: &Output) -> Result<()> {
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;

    let count = store
        .transfer()
        .import_from_interchange(&text)
        .await
        .with_context(|| format!("Failed to import {:?}", path))?;

    if count == 0 {
        output.message("No new bookmarks to import.");
    } else {
        output.success(&format!("Imported {} bookmark(s)", count));
    }
    Ok(())
}

/// Export every bookmark to stdout or a file
pub async fn export(
    store: &Store,
    format: ExportFormat,
    path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let result = match format {
        ExportFormat::Json => store.export_json(None).await,
        ExportFormat::Markdown => store.export_markdown(None).await,
    };
    let content = match result {
        Ok(content) => content,
        Err(e @ BookmarkError::PremiumRequired { .. }) => {
            anyhow::bail!("{}. Enable it with: bookmarkos settings set isPremium true", e)
        }
        Err(e) => return Err(e).context("Export failed"),
    };

    match path {
        Some(path) => {
            tokio::fs::write(&path, content)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;
            output.success(&format!("Exported bookmarks to {}", path.display()));
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Default file name for an export made today
pub fn default_export_name(format: ExportFormat) -> String {
    format!(
        "bookmarks-{}.{}",
        chrono::Local::now().format("%Y-%m-%d"),
        format.extension()
    )
}

/// Delete every stored bookmark
pub async fn clear(store: &Store, yes: bool, output: &Output) -> Result<()> {
    let count = store.bookmarks().count().await;

    if !yes && output.should_prompt() {
        println!("This will delete all {} bookmark(s).", count);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    } else if !yes {
        anyhow::bail!("Refusing to clear bookmarks without --yes");
    }

    store
        .transfer()
        .clear_all()
        .await
        .context("Failed to clear bookmarks")?;

    output.success(&format!("Deleted {} bookmark(s)", count));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use bookmarkos_core::{Bookmark, SettingUpdate};
    use tempfile::TempDir;

    #[test]
    fn test_default_export_name() {
        let name = default_export_name(ExportFormat::Markdown);
        assert!(name.starts_with("bookmarks-"));
        assert!(name.ends_with(".md"));
    }

    #[tokio::test]
    async fn test_export_requires_premium() {
        let store = Store::in_memory();
        let output = Output::new(OutputFormat::Quiet);

        let err = export(&store, ExportFormat::Json, None, &output)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("premium feature"));
    }

    #[tokio::test]
    async fn test_export_then_import_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("export.json");
        let output = Output::new(OutputFormat::Quiet);

        let source = Store::in_memory();
        source
            .settings()
            .update_one(SettingUpdate::IsPremium(true))
            .await
            .unwrap();
        source
            .bookmarks()
            .create(&Bookmark::new("https://a.com", "A"))
            .await
            .unwrap();
        export(&source, ExportFormat::Json, Some(path.clone()), &output)
            .await
            .unwrap();

        let target = Store::in_memory();
        import(&target, path, &output).await.unwrap();
        assert_eq!(target.bookmarks().count().await, 1);
    }

    #[tokio::test]
    async fn test_clear_needs_confirmation_when_not_interactive() {
        let store = Store::in_memory();
        store
            .bookmarks()
            .create(&Bookmark::new("https://a.com", "A"))
            .await
            .unwrap();
        let output = Output::new(OutputFormat::Quiet);

        assert!(clear(&store, false, &output).await.is_err());
        assert_eq!(store.bookmarks().count().await, 1);

        clear(&store, true, &output).await.unwrap();
        assert_eq!(store.bookmarks().count().await, 0);
    }
}

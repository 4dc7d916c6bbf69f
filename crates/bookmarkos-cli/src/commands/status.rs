//! Status command handler

use anyhow::Result;

use bookmarkos_core::storage::BOOKMARKS_KEY;
use bookmarkos_core::{BackendKind, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub async fn show(store: &Store, output: &Output) -> Result<()> {
    let config = store.config();
    let backend = store.backend_kind();
    let bookmarks = store.bookmarks().get_all().await;
    let unread = bookmarks.iter().filter(|b| !b.is_read).count();
    let corrupt = store.bookmarks().load().await.is_corrupt();
    let premium = store.is_premium_user().await;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "backend": backend.as_str(),
                    "data_dir": config.data_dir,
                    "premium": premium,
                    "corrupt": corrupt,
                    "counts": {
                        "bookmarks": bookmarks.len(),
                        "unread": unread
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", bookmarks.len());
        }
        OutputFormat::Human => {
            println!("Bookmark OS Status");
            println!("==================");
            println!();
            println!("Storage:");
            println!("  Backend:  {}", backend);
            match backend {
                BackendKind::File => {
                    println!("  Location: {}", config.key_path(BOOKMARKS_KEY).display())
                }
                BackendKind::Memory => println!("  Location: (in memory, not persisted)"),
            }
            if corrupt {
                println!("  Warning:  stored bookmarks could not be read");
            }
            println!();
            println!("Contents:");
            println!("  Bookmarks: {}", bookmarks.len());
            println!("  Unread:    {}", unread);
            println!();
            println!("Plan: {}", if premium { "premium" } else { "free" });
        }
    }

    Ok(())
}

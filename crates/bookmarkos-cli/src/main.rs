//! Bookmark OS CLI
//!
//! Command-line interface for Bookmark OS - saving, reading, and exporting
//! bookmarks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bookmarkos_core::{Config, StorageError, Store};

mod commands;
mod output;
mod prompt;

use commands::bookmark::ListArgs;
use commands::transfer::{default_export_name, ExportFormat};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "bookmarkos")]
#[command(about = "Bookmark OS - Save, tag, and read your bookmarks")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose logging to stderr (or the configured log file)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a new bookmark
    Add {
        /// URL to save
        url: String,
        /// Bookmark title
        #[arg(short = 'T', long)]
        title: String,
        /// Tags to add (repeatable, or comma-separated)
        #[arg(short, long)]
        tag: Vec<String>,
        /// Notes to attach
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List bookmarks
    #[command(alias = "ls")]
    List {
        /// Only bookmarks containing this text
        #[arg(short, long)]
        search: Option<String>,
        /// Filter preset: all, unread, or today (defaults to the saved setting)
        #[arg(short, long)]
        filter: Option<String>,
        /// Sort by date, title, or source
        #[arg(long, default_value = "date")]
        sort: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },
    /// Show bookmark details
    Show {
        /// Bookmark ID (full or prefix)
        id: String,
    },
    /// Mark a bookmark as read
    Read {
        /// Bookmark ID (full or prefix)
        id: String,
        /// Mark as unread instead
        #[arg(long)]
        unread: bool,
    },
    /// Toggle a bookmark's read status
    Toggle {
        /// Bookmark ID (full or prefix)
        id: String,
    },
    /// Delete a bookmark
    #[command(alias = "rm")]
    Delete {
        /// Bookmark ID (full or prefix)
        id: String,
    },
    /// List all tags
    Tags,
    /// Import bookmarks from a JSON export
    Import {
        /// File produced by `bookmarkos export --format json`
        file: PathBuf,
    },
    /// Export all bookmarks (premium)
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to a file instead of stdout (a dated name when no path is given)
        #[arg(short, long, num_args = 0..=1, value_name = "FILE")]
        output: Option<Option<PathBuf>>,
    },
    /// Delete all bookmarks
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (backend, location, counts)
    Status,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Change one setting
    Set {
        /// Setting key (darkMode, defaultFilter, isPremium, lastSyncDate)
        key: String,
        /// New value
        value: String,
    },
    /// Restore default settings
    Reset,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, backend, memory_quota_bytes, prefers_dark, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work even when the config file is broken
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let store = Store::open_with_config(config).context("Failed to open bookmark store")?;
    debug!("Store opened with {} backend", store.backend_kind());

    let result = match cli.command {
        Commands::Add {
            url,
            title,
            tag,
            notes,
        } => commands::bookmark::add(&store, url, title, tag, notes, &output).await,
        Commands::List {
            search,
            filter,
            sort,
            asc,
        } => {
            let args = ListArgs {
                search,
                filter,
                sort,
                asc,
            };
            commands::bookmark::list(&store, args, &output).await
        }
        Commands::Show { id } => commands::bookmark::show(&store, id, &output).await,
        Commands::Read { id, unread } => {
            commands::bookmark::mark_read(&store, id, !unread, &output).await
        }
        Commands::Toggle { id } => commands::bookmark::toggle(&store, id, &output).await,
        Commands::Delete { id } => commands::bookmark::delete(&store, id, &output).await,
        Commands::Tags => commands::tag::list(&store, &output).await,
        Commands::Import { file } => commands::transfer::import(&store, file, &output).await,
        Commands::Export {
            format,
            output: target,
        } => {
            let path = target.map(|p| p.unwrap_or_else(|| default_export_name(format).into()));
            commands::transfer::export(&store, format, path, &output).await
        }
        Commands::Clear { yes } => commands::transfer::clear(&store, yes, &output).await,
        Commands::Settings { command } => match command {
            Some(SettingsCommands::Show) | None => {
                commands::settings::show(&store, &output).await
            }
            Some(SettingsCommands::Set { key, value }) => {
                commands::settings::set(&store, key, value, &output).await
            }
            Some(SettingsCommands::Reset) => commands::settings::reset(&store, &output).await,
        },
        Commands::Status => commands::status::show(&store, &output).await,
        Commands::Config { .. } => Ok(()), // Handled above
    };

    if let Err(ref e) = result {
        if let Some(hint) = storage_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

/// Recovery advice for errors caused by a rejected write
fn storage_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<StorageError>())
        .and_then(StorageError::recovery_suggestion)
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Warnings and errors by default, debug with `--verbose`. `RUST_LOG`
/// replaces the filter entirely. Logs go to `config.log_file` when set,
/// otherwise to stderr.
fn init_logging(config: &Config, verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bookmarkos_core={},bookmarkos_cli={}",
            log_level, log_level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    if let Some(ref log_path) = config.log_file {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path);
        match log_file {
            Ok(file) => {
                let _ = builder
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .try_init();
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            }
        }
    }

    let _ = builder.with_writer(std::io::stderr).try_init();
}

//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use bookmarkos_core::{BackendChoice, Config};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend": config.backend,
                    "memory_quota_bytes": config.memory_quota_bytes,
                    "prefers_dark": config.prefers_dark,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:           {}", config.data_dir.display());
            println!("  backend:            {:?}", config.backend);
            println!(
                "  memory_quota_bytes: {}",
                config
                    .memory_quota_bytes
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "(unlimited)".to_string())
            );
            println!("  prefers_dark:       {}", config.prefers_dark);
            println!(
                "  log_file:           {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "backend" => {
            config.backend = value.parse::<BackendChoice>()?;
        }
        "memory_quota_bytes" => {
            config.memory_quota_bytes = if unset {
                None
            } else {
                Some(
                    value
                        .parse()
                        .context("Invalid value for memory_quota_bytes. Use a byte count.")?,
                )
            };
        }
        "prefers_dark" => {
            config.prefers_dark = value
                .parse()
                .context("Invalid value for prefers_dark. Use 'true' or 'false'.")?;
        }
        "log_file" => {
            config.log_file = if unset { None } else { Some(value.into()) };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, backend, memory_quota_bytes, prefers_dark, log_file",
                key
            );
        }
    }
    Ok(())
}

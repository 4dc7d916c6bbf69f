//! Settings command handlers

use anyhow::{Context, Result};

use bookmarkos_core::{SettingUpdate, Store};

use crate::output::Output;

/// Show the stored settings (or defaults)
pub async fn show(store: &Store, output: &Output) -> Result<()> {
    let settings = store.settings().get().await;
    output.print_settings(&settings)
}

/// Change one setting
pub async fn set(store: &Store, key: String, value: String, output: &Output) -> Result<()> {
    let update = SettingUpdate::parse(&key, &value)?;
    let name = update.key();

    store
        .settings()
        .update_one(update)
        .await
        .context("Failed to save settings")?;

    output.success(&format!("Set {} = {}", name, value.trim()));
    Ok(())
}

/// Forget stored settings
pub async fn reset(store: &Store, output: &Output) -> Result<()> {
    store
        .settings()
        .reset()
        .await
        .context("Failed to reset settings")?;
    output.success("Settings reset to defaults");
    Ok(())
}

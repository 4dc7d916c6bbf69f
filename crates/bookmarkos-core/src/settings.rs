//! Settings store
//!
//! A single settings record kept beside the bookmark collection. Reads
//! never fail: a missing or corrupt record is replaced by defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BookmarkError, BookmarkResult};
use crate::query::FilterPreset;
use crate::storage::{KeyValueStore, Loaded, SETTINGS_KEY};

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub default_filter: FilterPreset,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub last_sync_date: Option<DateTime<Utc>>,
}

impl Settings {
    /// Default record, with dark mode following the system preference
    pub fn defaults(prefers_dark: bool) -> Self {
        Self {
            dark_mode: prefers_dark,
            default_filter: FilterPreset::All,
            is_premium: false,
            last_sync_date: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults(false)
    }
}

/// A change to exactly one settings field
#[derive(Debug, Clone, PartialEq)]
pub enum SettingUpdate {
    DarkMode(bool),
    DefaultFilter(FilterPreset),
    IsPremium(bool),
    LastSyncDate(Option<DateTime<Utc>>),
}

impl SettingUpdate {
    /// Parse a `key value` pair as typed on the command line
    ///
    /// Keys are accepted in camelCase or snake_case. An empty value (or
    /// `none`) clears `lastSyncDate`.
    pub fn parse(key: &str, value: &str) -> BookmarkResult<Self> {
        let invalid = |reason: String| BookmarkError::InvalidSetting {
            key: key.to_string(),
            reason,
        };
        let value = value.trim();

        match key {
            "darkMode" | "dark_mode" => parse_bool(value).map(SettingUpdate::DarkMode).map_err(invalid),
            "isPremium" | "is_premium" => parse_bool(value).map(SettingUpdate::IsPremium).map_err(invalid),
            "defaultFilter" | "default_filter" => match value {
                "all" | "unread" | "today" => Ok(SettingUpdate::DefaultFilter(FilterPreset::parse(value))),
                other => Err(invalid(format!(
                    "unknown filter '{}', expected all, unread, or today",
                    other
                ))),
            },
            "lastSyncDate" | "last_sync_date" => {
                if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    return Ok(SettingUpdate::LastSyncDate(None));
                }
                DateTime::parse_from_rfc3339(value)
                    .map(|date| SettingUpdate::LastSyncDate(Some(date.with_timezone(&Utc))))
                    .map_err(|e| invalid(format!("expected an RFC 3339 timestamp: {}", e)))
            }
            _ => Err(invalid(
                "unknown key, expected darkMode, defaultFilter, isPremium, or lastSyncDate".into(),
            )),
        }
    }

    /// The serialized field name this update touches
    pub fn key(&self) -> &'static str {
        match self {
            SettingUpdate::DarkMode(_) => "darkMode",
            SettingUpdate::DefaultFilter(_) => "defaultFilter",
            SettingUpdate::IsPremium(_) => "isPremium",
            SettingUpdate::LastSyncDate(_) => "lastSyncDate",
        }
    }

    fn apply(self, settings: &mut Settings) {
        match self {
            SettingUpdate::DarkMode(v) => settings.dark_mode = v,
            SettingUpdate::DefaultFilter(v) => settings.default_filter = v,
            SettingUpdate::IsPremium(v) => settings.is_premium = v,
            SettingUpdate::LastSyncDate(v) => settings.last_sync_date = v,
        }
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("expected true or false, got '{}'", other)),
    }
}

/// Reads and writes the settings record
#[derive(Debug, Clone)]
pub struct SettingsStore {
    kv: KeyValueStore,
    prefers_dark: bool,
}

impl SettingsStore {
    pub fn new(kv: KeyValueStore, prefers_dark: bool) -> Self {
        Self { kv, prefers_dark }
    }

    /// Load the stored record without applying defaults
    pub async fn load(&self) -> Loaded<Settings> {
        self.kv.read(SETTINGS_KEY).await
    }

    /// Stored settings, or defaults when missing or corrupt
    pub async fn get(&self) -> Settings {
        let prefers_dark = self.prefers_dark;
        self.load()
            .await
            .unwrap_or_else(|| Settings::defaults(prefers_dark))
    }

    /// Overwrite the whole record
    pub async fn save(&self, settings: &Settings) -> BookmarkResult<()> {
        let _guard = self.kv.lock_writes().await;
        self.kv.write(SETTINGS_KEY, settings).await?;
        debug!("Saved settings");
        Ok(())
    }

    /// Change a single field, keeping the rest of the stored record
    pub async fn update_one(&self, update: SettingUpdate) -> BookmarkResult<Settings> {
        let _guard = self.kv.lock_writes().await;

        let mut settings = self.get().await;
        let key = update.key();
        update.apply(&mut settings);
        self.kv.write(SETTINGS_KEY, &settings).await?;

        info!("Updated setting {}", key);
        Ok(settings)
    }

    pub async fn is_premium_user(&self) -> bool {
        self.get().await.is_premium
    }

    /// Drop the stored record so the next read returns defaults
    pub async fn reset(&self) -> BookmarkResult<()> {
        let _guard = self.kv.lock_writes().await;
        self.kv.remove(SETTINGS_KEY).await?;
        info!("Settings reset to defaults");
        Ok(())
    }
}

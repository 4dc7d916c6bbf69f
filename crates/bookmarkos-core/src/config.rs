//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/bookmarkos/config.toml)
//! 3. Environment variables (BOOKMARKOS_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "BOOKMARKOS";

/// Which storage backend to use
///
/// `Auto` probes the data directory once at startup and falls back to the
/// in-memory store when it cannot be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    #[default]
    Auto,
    File,
    Memory,
}

impl std::str::FromStr for BackendChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendChoice::Auto),
            "file" => Ok(BackendChoice::File),
            "memory" => Ok(BackendChoice::Memory),
            other => anyhow::bail!("Unknown backend '{}'. Use auto, file, or memory.", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the stored bookmark and settings documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Storage backend selection
    #[serde(default)]
    pub backend: BackendChoice,

    /// Byte quota for the in-memory backend (unlimited when unset)
    #[serde(default)]
    pub memory_quota_bytes: Option<usize>,

    /// System dark-mode preference, used when settings are first created
    #[serde(default)]
    pub prefers_dark: bool,

    /// Log file path (logs go to stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: BackendChoice::Auto,
            memory_quota_bytes: None,
            prefers_dark: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (BOOKMARKOS_DATA_DIR, BOOKMARKOS_BACKEND, ...)
    /// 2. Config file (~/.config/bookmarkos/config.toml or BOOKMARKOS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Configuration rooted at a given data directory, ignoring files and env
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // BOOKMARKOS_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // BOOKMARKOS_BACKEND
        if let Ok(val) = std::env::var(format!("{}_BACKEND", ENV_PREFIX)) {
            match val.parse() {
                Ok(choice) => self.backend = choice,
                Err(e) => tracing::warn!("Ignoring {}_BACKEND: {}", ENV_PREFIX, e),
            }
        }

        // BOOKMARKOS_PREFERS_DARK
        if let Ok(val) = std::env::var(format!("{}_PREFERS_DARK", ENV_PREFIX)) {
            self.prefers_dark = val.eq_ignore_ascii_case("true") || val == "1";
        }

        // BOOKMARKOS_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with BOOKMARKOS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bookmarkos")
            .join("config.toml")
    }

    /// Path of the document holding one stored key
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bookmarkos")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "BOOKMARKOS_DATA_DIR",
        "BOOKMARKOS_BACKEND",
        "BOOKMARKOS_PREFERS_DARK",
        "BOOKMARKOS_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, BackendChoice::Auto);
        assert!(!config.prefers_dark);
        assert!(config.memory_quota_bytes.is_none());
        assert!(config.data_dir.ends_with("bookmarkos"));
    }

    #[test]
    fn test_key_path() {
        let config = Config::with_data_dir("/data/bookmarkos");
        assert_eq!(
            config.key_path("bookmarkos_bookmarks"),
            PathBuf::from("/data/bookmarkos/bookmarkos_bookmarks.json")
        );
    }

    #[test]
    fn test_backend_choice_parse() {
        assert_eq!("file".parse::<BackendChoice>().unwrap(), BackendChoice::File);
        assert_eq!("MEMORY".parse::<BackendChoice>().unwrap(), BackendChoice::Memory);
        assert!("cloud".parse::<BackendChoice>().is_err());
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BOOKMARKOS_DATA_DIR", "/tmp/bookmarkos-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/bookmarkos-test"));
    }

    #[test]
    fn test_env_override_backend() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BOOKMARKOS_BACKEND", "memory");
        config.apply_env_overrides();
        assert_eq!(config.backend, BackendChoice::Memory);

        // Unknown values leave the current choice alone
        env::set_var("BOOKMARKOS_BACKEND", "cloud");
        config.apply_env_overrides();
        assert_eq!(config.backend, BackendChoice::Memory);
    }

    #[test]
    fn test_env_override_prefers_dark() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BOOKMARKOS_PREFERS_DARK", "true");
        config.apply_env_overrides();
        assert!(config.prefers_dark);

        env::set_var("BOOKMARKOS_PREFERS_DARK", "0");
        config.apply_env_overrides();
        assert!(!config.prefers_dark);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/bookmarkos"),
            backend: BackendChoice::File,
            memory_quota_bytes: Some(5 * 1024 * 1024),
            prefers_dark: true,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("backend = \"file\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.backend, config.backend);
        assert_eq!(parsed.memory_quota_bytes, config.memory_quota_bytes);
        assert!(parsed.prefers_dark);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            backend = "memory"
            memory_quota_bytes = 1024
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.backend, BackendChoice::Memory);
        assert_eq!(config.memory_quota_bytes, Some(1024));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert_eq!(config.backend, BackendChoice::Auto);
        assert!(!config.prefers_dark);
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::with_data_dir(temp_dir.path());
        config.prefers_dark = true;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.data_dir, temp_dir.path());
        assert!(loaded.prefers_dark);
    }
}

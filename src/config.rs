//! Application configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};
use crate::storage::DEFAULT_STORAGE_KEY;
use crate::ui::TransitionTimings;

const APP_DIR: &str = "taskboard";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub timings: TimingsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            key: default_key(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".taskboard"))
}

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// Transition durations in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingsConfig {
    pub toast_visible: u64,
    pub toast_fade: u64,
    pub toast_enter: u64,
    pub cue_shake: u64,
    pub cue_reset: u64,
    pub row_insert: u64,
    pub row_remove: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            toast_visible: 3000,
            toast_fade: 300,
            toast_enter: 10,
            cue_shake: 500,
            cue_reset: 1000,
            row_insert: 300,
            row_remove: 300,
        }
    }
}

impl From<TimingsConfig> for TransitionTimings {
    fn from(config: TimingsConfig) -> Self {
        Self {
            toast_enter: Duration::from_millis(config.toast_enter),
            toast_visible: Duration::from_millis(config.toast_visible),
            toast_fade: Duration::from_millis(config.toast_fade),
            cue_shake: Duration::from_millis(config.cue_shake),
            cue_reset: Duration::from_millis(config.cue_reset),
            row_insert: Duration::from_millis(config.row_insert),
            row_remove: Duration::from_millis(config.row_remove),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` overrides it
    pub level: String,
    /// Relative paths resolve inside the data directory
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: PathBuf::from("taskboard.log"),
        }
    }
}

/// Default config file location, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Replaces a leading `~` component with the home directory, when known
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

impl AppConfig {
    /// Loads the config from an explicit path, else the default location, else
    /// built-in defaults. Only an explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BoardError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| BoardError::ConfigError(format!("{}: {e}", path.display())))
    }

    /// Parses TOML and expands a leading `~` in the configured paths
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| BoardError::ConfigError(e.to_string()))?;
        config.storage.data_dir = expand_home(&config.storage.data_dir);
        config.log.file = expand_home(&config.log.file);
        Ok(config)
    }

    pub fn log_path(&self) -> PathBuf {
        if self.log.file.is_absolute() {
            self.log.file.clone()
        } else {
            self.storage.data_dir.join(&self.log.file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::parse("").unwrap();

        assert_eq!(config.storage.key, "taskManagerPro");
        assert_eq!(config.timings, TimingsConfig::default());
        assert_eq!(config.log.level, "info");

        let timings: TransitionTimings = config.timings.into();
        assert_eq!(timings, TransitionTimings::default());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = AppConfig::parse(
            r#"
            [storage]
            data_dir = "/tmp/board"

            [timings]
            toast_visible = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/board"));
        assert_eq!(config.storage.key, "taskManagerPro");
        assert_eq!(config.timings.toast_visible, 1500);
        assert_eq!(config.timings.toast_fade, 300);
        assert_eq!(
            config.log_path(),
            PathBuf::from("/tmp/board").join("taskboard.log")
        );
    }

    #[test]
    fn test_tilde_paths_expand_to_home() {
        let config = AppConfig::parse("[storage]\ndata_dir = \"~/.taskboard\"\n").unwrap();

        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.storage.data_dir, home.join(".taskboard"));
            assert!(!config.storage.data_dir.starts_with("~"));
        }
        assert_eq!(
            expand_home(Path::new("relative/~/dir")),
            PathBuf::from("relative/~/dir")
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = AppConfig::parse("[timings]\ntoast_visible = \"soon\"");
        assert!(matches!(result, Err(BoardError::ConfigError(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(BoardError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log]\nlevel = \"debug\"\nfile = \"/var/log/board.log\"\n")
            .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log_path(), PathBuf::from("/var/log/board.log"));
    }
}

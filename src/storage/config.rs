//! JSON configuration file.
//!
//! Stored at `<config dir>/hotchat/config.json` (`~/Library/Application
//! Support/hotchat/config.json` on macOS). `HOTCHAT_CONFIG` overrides the
//! path. Every field has a default, so a partial file is fine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bridge::BridgeConfig;
use crate::model::constants::*;
use crate::model::{Binding, BindingParseError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no user config directory on this system")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Hotkey string, e.g. "Option+Space".
    pub hotkey: String,
    pub hotkey_enabled: bool,
    pub auto_hide_secs: u64,
    pub permission_retry_ms: u64,
    pub recent_message_limit: usize,
    /// Unset means bridge calls wait for a reply indefinitely.
    pub invoke_timeout_ms: Option<u64>,
    /// Refuse to register the hotkey until input monitoring is granted.
    pub require_permission: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hotkey: Binding::default().to_string(),
            hotkey_enabled: true,
            auto_hide_secs: AUTO_HIDE_TIMEOUT.as_secs(),
            permission_retry_ms: PERMISSION_RETRY_DELAY.as_millis() as u64,
            recent_message_limit: DEFAULT_RECENT_LIMIT,
            invoke_timeout_ms: None,
            require_permission: false,
        }
    }
}

impl AppConfig {
    pub fn binding(&self) -> Result<Binding, BindingParseError> {
        Binding::parse(&self.hotkey)
    }

    /// The configured binding, or the default one if the string is invalid.
    pub fn binding_or_default(&self) -> Binding {
        self.binding().unwrap_or_else(|e| {
            warn!(hotkey = %self.hotkey, error = %e, "Invalid hotkey in config, using default");
            Binding::default()
        })
    }

    pub fn auto_hide(&self) -> Duration {
        Duration::from_secs(self.auto_hide_secs)
    }

    pub fn permission_retry(&self) -> Duration {
        Duration::from_millis(self.permission_retry_ms)
    }

    pub fn bridge(&self) -> BridgeConfig {
        BridgeConfig {
            invoke_timeout: self.invoke_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Config file path: `$HOTCHAT_CONFIG`, else the platform config dir.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config, falling back to defaults if missing or invalid.
pub fn load_config() -> AppConfig {
    let path = match config_path() {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, "Using default config");
            return AppConfig::default();
        }
    };
    match load_config_from(&path) {
        Ok(config) => {
            debug!(path = %path.display(), "Loaded config");
            config
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file, using defaults");
            AppConfig::default()
        }
        Err(e) => {
            warn!(error = %e, "Using default config");
            AppConfig::default()
        }
    }
}

/// Write pretty JSON, creating the parent directory.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)
}

/// Load the config and write a default file on first run.
pub fn ensure_config() -> AppConfig {
    let config = load_config();
    if let Ok(path) = config_path() {
        if !path.exists() {
            match save_config_to(&path, &config) {
                Ok(()) => info!(path = %path.display(), "Wrote default config"),
                Err(e) => warn!(error = %e, "Could not write default config"),
            }
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.hotkey, "Option+Space");
        assert!(config.hotkey_enabled);
        assert_eq!(config.auto_hide(), Duration::from_secs(30));
        assert_eq!(config.permission_retry(), Duration::from_millis(500));
        assert_eq!(config.recent_message_limit, 3);
        assert_eq!(config.bridge().invoke_timeout, None);
        assert!(!config.require_permission);
        assert_eq!(config.binding().unwrap(), Binding::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"hotkey": "Cmd+Shift+K", "invoke_timeout_ms": 1500}"#)
                .unwrap();
        assert_eq!(config.hotkey, "Cmd+Shift+K");
        assert_eq!(
            config.bridge().invoke_timeout,
            Some(Duration::from_millis(1500))
        );
        assert_eq!(config.auto_hide_secs, 30);
    }

    #[test]
    fn test_invalid_hotkey_falls_back() {
        let config = AppConfig {
            hotkey: "Space".into(),
            ..AppConfig::default()
        };
        assert!(config.binding().is_err());
        assert_eq!(config.binding_or_default(), Binding::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            auto_hide_secs: 10,
            require_permission: true,
            ..AppConfig::default()
        };

        save_config_to(&path, &config).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_config_from(&missing),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            load_config_from(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    // HOTCHAT_CONFIG is process-wide; tests that set it hold this lock.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn with_config_path<R>(path: &Path, f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var(CONFIG_PATH_ENV, path);
        let result = f();
        std::env::remove_var(CONFIG_PATH_ENV);
        result
    }

    #[test]
    fn test_env_var_overrides_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        let saved = AppConfig {
            auto_hide_secs: 12,
            ..AppConfig::default()
        };
        save_config_to(&path, &saved).unwrap();

        let (resolved, loaded) = with_config_path(&path, || (config_path().unwrap(), load_config()));
        assert_eq!(resolved, path);
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let loaded = with_config_path(&path, load_config);
        assert_eq!(loaded, AppConfig::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ \"hotkey\": ").unwrap();

        let loaded = with_config_path(&path, load_config);
        assert_eq!(loaded, AppConfig::default());
        // The broken file is left for the user to fix.
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ \"hotkey\": ");
    }

    #[test]
    fn test_first_run_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotchat").join("config.json");

        let config = with_config_path(&path, ensure_config);
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let saved = AppConfig {
            hotkey: "Cmd+Shift+K".into(),
            ..AppConfig::default()
        };
        save_config_to(&path, &saved).unwrap();

        let config = with_config_path(&path, ensure_config);
        assert_eq!(config, saved);
        assert_eq!(load_config_from(&path).unwrap(), saved);
    }
}

//! Configuration Module
//! Application settings and per-model instrument command files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file looked up in the working directory at startup.
pub const SETTINGS_FILE: &str = "calimate.json";

/// Command that returns a Tektronix scope to local (front panel) control.
pub const DEFAULT_UNLOCK_COMMAND: &str = ":KEY:FORCe";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the `{Vendor}_{Model}.json` command files.
    pub instrument_config_dir: PathBuf,
    /// Sent to every discovered instrument unless its command file overrides it.
    pub unlock_command: String,
    pub visa_timeout_ms: u64,
    /// VISA resource expression used when listing instruments.
    pub resource_filter: String,
    pub thousands_separator: char,
    /// Treat the first CSV line as a header instead of data.
    pub skip_header: bool,
    pub auto_row_height: bool,
    pub column_widths: [f32; 3],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instrument_config_dir: PathBuf::from("."),
            unlock_command: DEFAULT_UNLOCK_COMMAND.to_string(),
            visa_timeout_ms: 2000,
            resource_filter: "?*INSTR".to_string(),
            thousands_separator: ',',
            skip_header: false,
            auto_row_height: true,
            column_widths: [80.0, 80.0, 440.0],
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `calimate.json` from `dir` if it exists, falling back to defaults.
    ///
    /// A broken settings file is logged and ignored so the application
    /// still starts.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            log::info!("No {} in {}, using defaults", SETTINGS_FILE, dir.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }
}

/// Commands read from a per-model instrument file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentCommands {
    #[serde(default)]
    pub connect: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
    #[serde(default)]
    pub unlock: Option<String>,
}

impl InstrumentCommands {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Unlock command to send, preferring the model's own.
    pub fn unlock_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.unlock.as_deref().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.unlock_command, ":KEY:FORCe");
    }

    #[test]
    fn partial_settings_keep_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "skip_header": true, "thousands_separator": "." }"#,
        )
        .unwrap();

        let config = AppConfig::load_or_default(dir.path());
        assert!(config.skip_header);
        assert_eq!(config.thousands_separator, '.');
        assert_eq!(config.visa_timeout_ms, 2000);
    }

    #[test]
    fn broken_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert_eq!(AppConfig::load_or_default(dir.path()), AppConfig::default());
    }

    #[test]
    fn reads_instrument_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TEKTRONIX_MSO54.json");
        fs::write(
            &path,
            r#"{ "connect": "*CLS", "id": "*IDN?", "close": ":KEY:FORCe" }"#,
        )
        .unwrap();

        let commands = InstrumentCommands::from_file(&path).unwrap();
        assert_eq!(commands.connect.as_deref(), Some("*CLS"));
        assert_eq!(commands.id.as_deref(), Some("*IDN?"));
        assert_eq!(commands.unlock_or(DEFAULT_UNLOCK_COMMAND), ":KEY:FORCe");
    }

    #[test]
    fn model_unlock_overrides_default() {
        let commands: InstrumentCommands =
            serde_json::from_str(r#"{ "unlock": "SYST:LOC" }"#).unwrap();
        assert_eq!(commands.unlock_or(DEFAULT_UNLOCK_COMMAND), "SYST:LOC");
        assert!(commands.connect.is_none());
    }

    #[test]
    fn invalid_command_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            InstrumentCommands::from_file(&path),
            Err(ConfigError::Json { .. })
        ));
    }
}

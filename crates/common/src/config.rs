//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BdclipResult;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Settings for reaching the compiling service.
    pub compiler: CompilingSettings,

    /// Language token used for subtitles when none are given on the
    /// command line. `None` falls back to the process locale.
    pub default_language: Option<String>,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Configuration for one orchestration run against the compiling service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilingSettings {
    /// Compiler executable. When set, it is launched before connecting.
    pub compiler_path: Option<PathBuf>,

    /// Directory holding the schemas the compiler validates against.
    pub schema_dir: PathBuf,

    /// Root under which per-project workspaces are created.
    pub temp_dir: PathBuf,

    /// Host the compiling service listens on.
    pub host: String,

    /// TCP port the compiling service listens on.
    pub port: u16,

    /// Named endpoint exposed by the service.
    pub endpoint: String,

    /// Memory bound for the service's internal cache, in bytes.
    pub cache_size: u64,

    /// Connection attempts (100 ms apart) while a launched compiler starts.
    pub startup_attempts: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "bdclip_compiler=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            compiler: CompilingSettings::default(),
            default_language: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CompilingSettings {
    fn default() -> Self {
        Self {
            compiler_path: None,
            schema_dir: PathBuf::from("schema"),
            temp_dir: std::env::temp_dir().join("bdclip"),
            host: "localhost".to_string(),
            port: 9750,
            endpoint: "CompilingService".to_string(),
            cache_size: 256 * 1024 * 1024,
            startup_attempts: 50,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CompilingSettings {
    /// Connection string for the configured service,
    /// e.g. `tcp://localhost:9750/CompilingService`.
    pub fn connection_string(&self) -> String {
        format!("tcp://{}:{}/{}", self.host, self.port, self.endpoint)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> BdclipResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("bdclip").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_uses_host_port_and_endpoint() {
        let settings = CompilingSettings {
            host: "render-box".to_string(),
            port: 4100,
            ..CompilingSettings::default()
        };
        assert_eq!(
            settings.connection_string(),
            "tcp://render-box:4100/CompilingService"
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.compiler.port = 9999;
        config.default_language = Some("jpn".to_string());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.compiler.port, 9999);
        assert_eq!(loaded.default_language.as_deref(), Some("jpn"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"compiler":{"port":1234}}"#).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.compiler.port, 1234);
        assert_eq!(loaded.compiler.host, "localhost");
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.compiler, CompilingSettings::default());
    }
}

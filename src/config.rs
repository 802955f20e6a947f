//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::{ArchiveOptions, TimeBasis};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub normals: NormalsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Archive database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub time_basis: TimeBasis,

    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> String {
    "/var/lib/weewx/weewx.sdb".to_string()
}

fn default_busy_timeout() -> u64 {
    5000
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            time_basis: TimeBasis::default(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl ArchiveConfig {
    /// Options for opening the archive
    pub fn options(&self) -> ArchiveOptions {
        ArchiveOptions::new(&self.db_path)
            .time_basis(self.time_basis)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Socket address string to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Climate normals configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NormalsConfig {
    #[serde(default = "default_normals_enabled")]
    pub enabled: bool,

    pub path: Option<String>,
}

fn default_normals_enabled() -> bool {
    true
}

impl Default for NormalsConfig {
    fn default() -> Self {
        Self {
            enabled: default_normals_enabled(),
            path: None,
        }
    }
}

impl NormalsConfig {
    /// Normals file to load, if normals are enabled and a path is set
    pub fn active_path(&self) -> Option<PathBuf> {
        if self.enabled {
            self.path.as_ref().map(PathBuf::from)
        } else {
            None
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("wxarchive").join("config.toml")),
            Some(PathBuf::from("/etc/wxarchive/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Archive overrides
        if let Ok(db_path) = std::env::var("WXARCHIVE_DB_PATH") {
            self.archive.db_path = db_path;
        }
        if let Ok(basis) = std::env::var("WXARCHIVE_TIME_BASIS") {
            match basis.parse() {
                Ok(b) => self.archive.time_basis = b,
                Err(e) => tracing::warn!("Ignoring WXARCHIVE_TIME_BASIS: {}", e),
            }
        }

        // API overrides
        if let Ok(host) = std::env::var("WXARCHIVE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("WXARCHIVE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Normals overrides
        if let Ok(path) = std::env::var("WXARCHIVE_NORMALS_PATH") {
            self.normals.path = Some(path);
        }

        // Logging overrides
        if let Ok(level) = std::env::var("WXARCHIVE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WXARCHIVE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# wxarchive Configuration
#
# Environment variables override these settings:
# - WXARCHIVE_DB_PATH
# - WXARCHIVE_TIME_BASIS
# - WXARCHIVE_API_HOST
# - WXARCHIVE_API_PORT
# - WXARCHIVE_NORMALS_PATH
# - WXARCHIVE_LOG_LEVEL
# - WXARCHIVE_LOG_FORMAT

[archive]
# weewx SQLite archive
db_path = "/var/lib/weewx/weewx.sdb"

# Time zone of the daily summary boundaries: "local" or "utc"
time_basis = "local"

# How long a reader waits on a locked database (ms)
busy_timeout_ms = 5000

[api]
# API server host
host = "localhost"

# API server port
port = 8000

# Request timeout in seconds
request_timeout_secs = 30

[normals]
# Serve climate normals when a normals file is configured
enabled = true

# Pre-computed daily normals (JSON)
# path = "/var/lib/weewx/prism_daily_normals.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::from_toml(&generate_default_config()).unwrap();
        assert_eq!(config.archive.db_path, "/var/lib/weewx/weewx.sdb");
        assert_eq!(config.archive.time_basis, TimeBasis::Local);
        assert_eq!(config.api.port, 8000);
        assert!(config.normals.enabled);
        assert_eq!(config.normals.active_path(), None);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [archive]
            db_path = "/tmp/weewx.sdb"
            time_basis = "utc"

            [normals]
            enabled = false
            path = "/tmp/normals.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.archive.time_basis, TimeBasis::Utc);
        assert_eq!(config.archive.busy_timeout_ms, 5000);
        assert_eq!(config.api.host, "localhost");
        assert_eq!(config.normals.active_path(), None);

        let options = config.archive.options();
        assert_eq!(options.path, PathBuf::from("/tmp/weewx.sdb"));
        assert_eq!(options.busy_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/wxarchive.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}

//! Configuration management for MalDetect.

use crate::core::error::{Error, Result};
use crate::core::types::Algorithm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scanning server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Bulk-scan pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Report export settings
    #[serde(default)]
    pub reports: ReportConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigLoad(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigSave(format!("Failed to create config directory: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| Error::ConfigSave(format!("Failed to write config file: {}", e)))
    }

    /// Load configuration from default location, or create default if not exists.
    pub fn load_or_default() -> Self {
        Self::load_from_or_default(&Self::default_config_path())
    }

    /// Load configuration from `path`, falling back to defaults.
    ///
    /// Defaults are written only when no file exists; an unreadable file
    /// is left untouched.
    pub fn load_from_or_default(config_path: &Path) -> Self {
        if config_path.exists() {
            return Self::load(config_path).unwrap_or_else(|e| {
                log::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            });
        }

        let config = Self::default();
        if let Err(e) = config.save(config_path) {
            log::warn!("Failed to save default config: {}", e);
        }
        config
    }

    /// Load a file the user named explicitly: parse errors are returned,
    /// a missing file is created with defaults.
    pub fn load_explicit(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            Ok(Self::load_from_or_default(config_path))
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    /// Get the application data directory.
    pub fn data_dir() -> PathBuf {
        #[cfg(windows)]
        {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData"))
                .join("MalDetect")
        }

        #[cfg(not(windows))]
        {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("maldetect")
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<()> {
        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::ConfigInvalid {
                field: "server.base_url".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        }

        if self.server.timeout_secs == 0 {
            return Err(Error::ConfigInvalid {
                field: "server.timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.pipeline.inter_item_delay_ms > 10_000 {
            return Err(Error::ConfigInvalid {
                field: "pipeline.inter_item_delay_ms".to_string(),
                message: "Must be at most 10000".to_string(),
            });
        }

        Ok(())
    }
}

/// Scanning server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the MalDetect server
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Algorithm sent with every upload unless overridden (server picks when unset)
    pub default_algorithm: Option<Algorithm>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 60,
            default_algorithm: None,
        }
    }
}

impl ServerConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Bulk-scan pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause between uploads so progress output stays readable
    pub inter_item_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inter_item_delay_ms: 100,
        }
    }
}

impl PipelineConfig {
    /// Inter-item delay as a `Duration`.
    pub fn inter_item_delay(&self) -> Duration {
        Duration::from_millis(self.inter_item_delay_ms)
    }
}

/// Report export configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory for exported reports (current directory when unset)
    pub output_dir: Option<PathBuf>,
}

impl ReportConfig {
    /// Resolve a default report filename against the output directory.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Path for a log file (console only when unset)
    pub log_path: Option<PathBuf>,
    /// Enable verbose console output
    pub verbose_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_path: None,
            verbose_console: false,
        }
    }
}

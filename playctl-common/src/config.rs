//! Configuration loading and config file resolution
//!
//! All settings live in a single TOML file. Every field has a built-in default,
//! so a missing file (or a file with missing sections) still yields a usable
//! configuration.
//!
//! Config file resolution order:
//! 1. Explicit path (e.g. a command-line argument)
//! 2. `PLAYCTL_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/playctl/config.toml`)
//! 4. Built-in defaults (no file)

use crate::time::millis_to_duration;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "PLAYCTL_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayctlConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Load error handling policy constants
    pub load_error: LoadErrorConfig,

    /// Metadata retrieval settings
    pub metadata: MetadataConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Constants for the default load error handling policy
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoadErrorConfig {
    /// How long a track is excluded after a 404/410 response
    pub exclusion_duration_ms: u64,

    /// Retry delay added per previous failed attempt
    pub retry_delay_step_ms: u64,

    /// Upper bound for any retry delay
    pub max_retry_delay_ms: u64,

    /// Fixed minimum retry count; `None` picks a value by data type
    pub min_loadable_retry_count: Option<u32>,
}

impl Default for LoadErrorConfig {
    fn default() -> Self {
        Self {
            exclusion_duration_ms: 60_000,
            retry_delay_step_ms: 1_000,
            max_retry_delay_ms: 5_000,
            min_loadable_retry_count: None,
        }
    }
}

impl LoadErrorConfig {
    /// Exclusion duration as Duration
    pub fn exclusion_duration(&self) -> Duration {
        millis_to_duration(self.exclusion_duration_ms)
    }

    /// Maximum retry delay as Duration
    pub fn max_retry_delay(&self) -> Duration {
        millis_to_duration(self.max_retry_delay_ms)
    }
}

/// Metadata retrieval settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetadataConfig {
    /// How often pending source/prepare errors are polled
    pub error_poll_interval_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            error_poll_interval_ms: 100,
        }
    }
}

impl MetadataConfig {
    /// Error poll interval as Duration
    pub fn error_poll_interval(&self) -> Duration {
        // tokio intervals panic on a zero period
        millis_to_duration(self.error_poll_interval_ms.max(1))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PlayctlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: PlayctlConfig = toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or if values are
    /// inconsistent (see [`PlayctlConfig::validate`]).
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;
        let config = Self::from_toml_str(&toml_str)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Resolve the config file and load it, falling back to defaults
    ///
    /// A config file that does not exist is not an error: a warning is logged
    /// and built-in defaults are used. A file that exists but cannot be parsed
    /// is an error.
    pub fn load_or_default(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                warn!("Config file {:?} not found, using built-in defaults", path);
                Ok(Self::default())
            }
            None => {
                info!("No config file location available, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<()> {
        let le = &self.load_error;
        if le.retry_delay_step_ms > le.max_retry_delay_ms {
            return Err(Error::Config(format!(
                "load_error.retry_delay_step_ms ({}) exceeds load_error.max_retry_delay_ms ({})",
                le.retry_delay_step_ms, le.max_retry_delay_ms
            )));
        }
        if self.logging.level.trim().is_empty() {
            return Err(Error::Config("logging.level must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Config file resolution following the priority order in the module docs
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Explicit argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path()
}

/// Get default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playctl").join("config.toml"))
}

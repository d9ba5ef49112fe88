//! Configuration management for siteintel
//!
//! All configuration is loaded from `./config/siteintel.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the config template.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/siteintel.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/siteintel.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Configuration field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

/// Load-time measurement and batch concurrency configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum domains analyzed concurrently
    pub max_concurrent: usize,
    /// Timed fetches per domain
    pub measurement_rounds: usize,
    /// Pause between measurement rounds (milliseconds)
    pub measurement_delay_ms: u64,
}

/// Page-existence probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_probe_concurrency")]
    pub max_concurrent: usize,
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_probe_concurrency() -> usize {
    10
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout_secs(),
            max_concurrent: default_probe_concurrency(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }

        if self.analysis.max_concurrent == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "analysis.max_concurrent".to_string(),
            });
        }
        if self.analysis.max_concurrent > 100 {
            return Err(ConfigError::OutOfRange {
                field: "analysis.max_concurrent".to_string(),
                reason: "must be at most 100".to_string(),
            });
        }
        if self.analysis.measurement_rounds == 0 {
            return Err(ConfigError::OutOfRange {
                field: "analysis.measurement_rounds".to_string(),
                reason: "at least one measurement round is required".to_string(),
            });
        }

        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "probe.timeout_secs".to_string(),
            });
        }
        if self.probe.max_concurrent == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "probe.max_concurrent".to_string(),
            });
        }

        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write default config
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        atty::is(atty::Stream::Stdin)
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}

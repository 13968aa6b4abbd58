//! Courier configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::RetryPolicy;

/// Project-local config file picked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "courier.yml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Main Courier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// Seconds between scans of the store. A plain fixed interval; cron
    /// expressions are not supported.
    pub scan_interval_secs: u64,

    /// Items sent in parallel within one scan
    pub concurrency: usize,

    /// SQLite file holding `instances_to_dispatch`
    pub database_path: PathBuf,

    /// Default filter when RUST_LOG is unset
    pub log_level: String,

    /// Emit logs as JSON lines
    pub log_json: bool,

    pub retry: RetryConfig,

    pub http: HttpConfig,

    /// Schema-less payload type tags accepted by the dispatcher
    pub payload_types: Vec<String>,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 60,
            concurrency: 4,
            database_path: PathBuf::from("courier.db"),
            log_level: "info".to_string(),
            log_json: false,
            retry: RetryConfig::default(),
            http: HttpConfig::default(),
            payload_types: Vec::new(),
        }
    }
}

impl CourierConfig {
    /// Load configuration with fallback chain: explicit path, `./courier.yml`, defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        tracing::info!("No config file found, using defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content)?;
        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the dispatcher cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "scan_interval_secs must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err(ConfigError::Invalid(format!(
                "retry.jitter_factor must be within [0, 1], got {}",
                self.retry.jitter_factor
            )));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(ConfigError::Invalid(
                "retry.base_delay_ms must be greater than 0".into(),
            ));
        }
        if self
            .retry
            .max_backoff_ms
            .is_some_and(|max| max < self.retry.base_delay_ms)
        {
            return Err(ConfigError::Invalid(
                "retry.max_backoff_ms must not be below retry.base_delay_ms".into(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.payload_types.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "payload_types must not contain blank entries".into(),
            ));
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

/// Backoff settings for failed sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub jitter_factor: f64,
    pub max_backoff_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 1000,
            jitter_factor: 0.9,
            max_backoff_ms: None,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            jitter_factor: config.jitter_factor,
            max_backoff: config.max_backoff_ms.map(Duration::from_millis),
        }
    }
}

/// Outbound HTTP settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub payload_type_header: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            payload_type_header: "X-Payload-Type".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

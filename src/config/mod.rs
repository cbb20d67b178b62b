//! Platform configuration file
//!
//! The file is TOML and lives at ~/.yandexgpt-sensor/config.toml unless
//! overridden by `YANDEXGPT_SENSOR_CONFIG` or `--config`.

pub mod errors;
pub mod sensor;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env::config as env_config;
use crate::services::yandexgpt::{
    CompletionMode, YandexGptConfig, DEFAULT_BASE_URL, DEFAULT_OPERATIONS_URL,
};

pub use errors::ConfigError;
pub use sensor::{validate_all, RawSensorConfig, SensorConfig, DEFAULT_NAME};

const DEFAULT_SCAN_INTERVAL_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Endpoint settings shared by every sensor's client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations_url: Option<String>,
    #[serde(default)]
    pub mode: CompletionMode,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            operations_url: None,
            mode: CompletionMode::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl ApiSettings {
    /// Client config for one sensor's credentials
    pub fn client_config(&self, model: &str, catalog_id: &str, api_key: &str) -> YandexGptConfig {
        YandexGptConfig::for_api_key(model, catalog_id, api_key)
            .with_base_url(
                self.base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            )
            .with_operations_url(
                self.operations_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPERATIONS_URL.to_string()),
            )
            .with_mode(self.mode)
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }
}

/// Configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Seconds between polls
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    #[serde(default)]
    pub api: ApiSettings,

    /// Initial entity states visible to templates
    #[serde(default)]
    pub states: BTreeMap<String, String>,

    #[serde(default, rename = "sensor")]
    pub sensors: Vec<RawSensorConfig>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            scan_interval: DEFAULT_SCAN_INTERVAL_SECS,
            api: ApiSettings::default(),
            states: BTreeMap::new(),
            sensors: Vec::new(),
        }
    }
}

impl PlatformConfig {
    /// Resolve the config path: environment variable first, then the home directory
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(env_config::CONFIG_PATH) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home_dir.join(".yandexgpt-sensor").join("config.toml"))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            sensors = config.sensors.len(),
            "Loaded platform config"
        );

        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: PlatformConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Platform-level checks; sensor blocks are validated by the loader
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan_interval".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.api.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.poll_interval_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }
}

/// Mask API key for display (show first 4 and last 4 characters)
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

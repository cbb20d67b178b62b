use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

use crate::env::logging as env_vars;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging configuration for the sensor binary
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: Level,
    /// Whether to log to stdout
    pub stdout: bool,
    /// Optional file path for logging
    pub file_path: Option<PathBuf>,
    /// Whether to use JSON format
    pub json_format: bool,
    /// Whether to use ANSI colors
    pub use_colors: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            stdout: true,
            file_path: None,
            json_format: false,
            use_colors: true,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_stdout(mut self, enabled: bool) -> Self {
        self.stdout = enabled;
        self
    }

    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.use_colors = enabled;
        self
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level_str) = env::var(env_vars::LOG_LEVEL) {
            if let Some(level) = parse_level(&level_str) {
                config.level = level;
            }
        }

        if let Ok(file_path) = env::var(env_vars::LOG_FILE) {
            if !file_path.is_empty() {
                config.file_path = Some(PathBuf::from(file_path));
            }
        }

        if env::var(env_vars::LOG_JSON).is_ok() {
            config.json_format = true;
        }

        if env::var(env_vars::NO_COLOR).is_ok() {
            config.use_colors = false;
        }

        config
    }
}

/// Parse a textual log level; unknown names yield `None`
pub fn parse_level(value: &str) -> Option<Level> {
    match value.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Initialize logging with the given configuration
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = LevelFilter::from_level(config.level);
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.stdout {
        let layer: BoxedLayer = if config.json_format {
            fmt::layer().json().with_target(true).with_filter(filter).boxed()
        } else {
            fmt::layer()
                .with_ansi(config.use_colors)
                .with_level(true)
                .with_target(true)
                .with_filter(filter)
                .boxed()
        };
        layers.push(layer);
    }

    if let Some(path) = &config.file_path {
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path
            .file_name()
            .with_context(|| format!("Log file path has no file name: {}", path.display()))?;

        std::fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;

        let appender = tracing_appender::rolling::never(&directory, file_name);
        let layer: BoxedLayer = if config.json_format {
            fmt::layer()
                .json()
                .with_writer(appender)
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_ansi(false)
                .with_writer(appender)
                .with_filter(filter)
                .boxed()
        };
        layers.push(layer);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        level = ?config.level,
        stdout = config.stdout,
        file_path = ?config.file_path,
        json_format = config.json_format,
        "Logging initialized"
    );

    Ok(())
}

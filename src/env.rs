//! Environment variable constants used throughout the application
//!
//! The sensor itself reads no environment variables; these only affect the
//! standalone binary (logging and where the config file lives).

/// Logging configuration
pub mod logging {
    /// Log level configuration (e.g., "debug", "info", "warn", "error")
    pub const LOG_LEVEL: &str = "YANDEXGPT_SENSOR_LOG_LEVEL";

    /// Log file path for file-based logging
    pub const LOG_FILE: &str = "YANDEXGPT_SENSOR_LOG_FILE";

    /// Emit JSON log lines instead of human-readable text
    pub const LOG_JSON: &str = "YANDEXGPT_SENSOR_LOG_JSON";

    /// Disable colored output (follows the NO_COLOR standard)
    pub const NO_COLOR: &str = "NO_COLOR";
}

/// Configuration file location
pub mod config {
    /// Path to the platform config file, overrides ~/.yandexgpt-sensor/config.toml
    pub const CONFIG_PATH: &str = "YANDEXGPT_SENSOR_CONFIG";
}

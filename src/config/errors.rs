use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("Invalid template in '{field}': {message}")]
    InvalidTemplate { field: &'static str, message: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Sensor #{index}: {source}")]
    Sensor {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Could not find home directory")]
    NoHomeDirectory,
}

impl ConfigError {
    /// Name of the offending field, looking through sensor wrappers
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field }
            | ConfigError::EmptyField { field }
            | ConfigError::InvalidTemplate { field, .. } => Some(*field),
            ConfigError::InvalidValue { field, .. } => Some(field.as_str()),
            ConfigError::Sensor { source, .. } => source.field(),
            _ => None,
        }
    }

    pub fn is_missing_field(&self) -> bool {
        match self {
            ConfigError::MissingField { .. } => true,
            ConfigError::Sensor { source, .. } => source.is_missing_field(),
            _ => false,
        }
    }

    pub fn is_invalid_template(&self) -> bool {
        match self {
            ConfigError::InvalidTemplate { .. } => true,
            ConfigError::Sensor { source, .. } => source.is_invalid_template(),
            _ => false,
        }
    }
}

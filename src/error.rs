use thiserror::Error;

use crate::services::yandexgpt::YandexGptError;
use crate::template::TemplateError;

/// Errors raised by a sensor's update cycle
///
/// Neither variant is handled inside the sensor: both are returned as-is to
/// whoever invoked `async_update`.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Completion error: {0}")]
    Completion(#[from] YandexGptError),
}

impl SensorError {
    pub fn is_template_error(&self) -> bool {
        matches!(self, SensorError::Template(_))
    }

    pub fn is_completion_error(&self) -> bool {
        matches!(self, SensorError::Completion(_))
    }

    /// The underlying completion error, if any
    pub fn completion_error(&self) -> Option<&YandexGptError> {
        match self {
            SensorError::Completion(error) => Some(error),
            SensorError::Template(_) => None,
        }
    }

    /// Short category label used in log fields
    pub fn category(&self) -> &'static str {
        match self {
            SensorError::Template(_) => "template",
            SensorError::Completion(_) => "completion",
        }
    }
}

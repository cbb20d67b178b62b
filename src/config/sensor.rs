//! Schema of one `[[sensor]]` block

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::errors::ConfigError;
use crate::template::{PromptTemplate, TemplateEngine};

pub const DEFAULT_NAME: &str = "YandexGpt response";

pub const CONF_NAME: &str = "name";
pub const CONF_CATALOG_ID: &str = "catalog_id";
pub const CONF_API_KEY: &str = "api_key";
pub const CONF_SYSTEM_PROMPT: &str = "system_prompt";
pub const CONF_USER_PROMPT: &str = "user_prompt";

/// A sensor block as written in the config file, before validation
///
/// Scalars (numbers, booleans) are accepted wherever a string is expected and
/// coerced to their textual form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSensorConfig {
    #[serde(default, deserialize_with = "coerce_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce_string")]
    pub catalog_id: Option<String>,
    #[serde(default, deserialize_with = "coerce_string")]
    pub api_key: Option<String>,
    #[serde(default, deserialize_with = "coerce_string")]
    pub system_prompt: Option<String>,
    #[serde(default, deserialize_with = "coerce_string")]
    pub user_prompt: Option<String>,
}

fn coerce_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Boolean(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(s) => s,
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Boolean(b) => b.to_string(),
    }))
}

/// A validated sensor block; the user prompt is already compiled
#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub name: String,
    pub catalog_id: String,
    pub api_key: String,
    pub system_prompt: String,
    pub user_prompt: PromptTemplate,
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, ConfigError> {
    match value {
        None => Err(ConfigError::MissingField { field }),
        Some(s) if s.trim().is_empty() => Err(ConfigError::EmptyField { field }),
        Some(s) => Ok(s.clone()),
    }
}

impl RawSensorConfig {
    /// Validate every field and compile the user prompt against `engine`
    pub fn validate(&self, engine: &Arc<TemplateEngine>) -> Result<SensorConfig, ConfigError> {
        let name = match &self.name {
            None => DEFAULT_NAME.to_string(),
            Some(name) if name.trim().is_empty() => {
                return Err(ConfigError::EmptyField { field: CONF_NAME })
            }
            Some(name) => name.clone(),
        };

        let catalog_id = required(&self.catalog_id, CONF_CATALOG_ID)?;
        let api_key = required(&self.api_key, CONF_API_KEY)?;
        let system_prompt = required(&self.system_prompt, CONF_SYSTEM_PROMPT)?;
        let user_prompt_source = required(&self.user_prompt, CONF_USER_PROMPT)?;

        let user_prompt =
            PromptTemplate::new(user_prompt_source, Arc::clone(engine)).map_err(|e| {
                ConfigError::InvalidTemplate {
                    field: CONF_USER_PROMPT,
                    message: e.to_string(),
                }
            })?;

        Ok(SensorConfig {
            name,
            catalog_id,
            api_key,
            system_prompt,
            user_prompt,
        })
    }
}

/// Validate all blocks; the first failure aborts with the block's index
pub fn validate_all(
    sensors: &[RawSensorConfig],
    engine: &Arc<TemplateEngine>,
) -> Result<Vec<SensorConfig>, ConfigError> {
    sensors
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            raw.validate(engine).map_err(|e| ConfigError::Sensor {
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

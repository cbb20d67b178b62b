//! Platform loader: turns validated sensor blocks into registered entities

use std::sync::Arc;

use super::entity::YandexGptSensor;
use super::SensorEntity;
use crate::config::{validate_all, ApiSettings, ConfigError, RawSensorConfig, SensorConfig};
use crate::hub::{AddEntities, RunStateQuery};
use crate::services::yandexgpt::{YandexGptClient, DEFAULT_MODEL};
use crate::template::TemplateEngine;

/// Host services a platform loader needs
#[derive(Clone)]
pub struct PlatformContext {
    pub run_state: Arc<dyn RunStateQuery>,
    pub templates: Arc<TemplateEngine>,
    pub api: ApiSettings,
}

impl PlatformContext {
    pub fn new(
        run_state: Arc<dyn RunStateQuery>,
        templates: Arc<TemplateEngine>,
        api: ApiSettings,
    ) -> Self {
        Self {
            run_state,
            templates,
            api,
        }
    }
}

fn build_sensor(
    config: SensorConfig,
    context: &PlatformContext,
) -> Result<Box<dyn SensorEntity>, ConfigError> {
    // Each sensor gets its own client, even when credentials repeat.
    let client_config =
        context
            .api
            .client_config(DEFAULT_MODEL, &config.catalog_id, &config.api_key);
    let client = YandexGptClient::new(client_config).map_err(|e| ConfigError::InvalidValue {
        field: "api".to_string(),
        message: e.to_string(),
    })?;

    Ok(Box::new(YandexGptSensor::new(
        config.name,
        config.system_prompt,
        Box::new(config.user_prompt),
        Box::new(client),
        Arc::clone(&context.run_state),
    )))
}

/// Validate one sensor block and register exactly one entity for it
///
/// Nothing is registered when validation fails, and no request is sent.
pub fn setup_platform(
    raw: &RawSensorConfig,
    context: &PlatformContext,
    add_entities: &mut dyn AddEntities,
) -> Result<(), ConfigError> {
    let config = raw.validate(&context.templates)?;
    let sensor = build_sensor(config, context)?;
    add_entities.add_entities(vec![sensor], true);
    Ok(())
}

/// Set up every sensor block of a config file
///
/// All blocks are validated and their clients built before the first entity
/// is registered, so one bad block leaves the hub untouched.
pub fn setup_platforms(
    sensors: &[RawSensorConfig],
    context: &PlatformContext,
    add_entities: &mut dyn AddEntities,
) -> Result<usize, ConfigError> {
    let configs = validate_all(sensors, &context.templates)?;

    let entities = configs
        .into_iter()
        .enumerate()
        .map(|(index, config)| {
            build_sensor(config, context).map_err(|e| ConfigError::Sensor {
                index,
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let count = entities.len();
    for entity in entities {
        add_entities.add_entities(vec![entity], true);
    }

    tracing::info!(sensors = count, "YandexGPT sensor platform set up");
    Ok(count)
}

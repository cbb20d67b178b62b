use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::config::PlatformConfig;
use crate::hub::StateStore;
use crate::template::{Renderable, TemplateEngine};

pub fn handle_render_command(config_path: &Path, sensor_name: &str) -> Result<()> {
    let config = PlatformConfig::load_from_file(config_path)
        .with_context(|| "Failed to load platform config")?;

    let states = Arc::new(StateStore::new());
    states.extend(config.states.clone());
    let engine = Arc::new(TemplateEngine::new(states));

    let raw = config
        .sensors
        .iter()
        .find(|s| s.name.as_deref().unwrap_or(crate::config::DEFAULT_NAME) == sensor_name)
        .with_context(|| format!("No sensor named '{sensor_name}' in config"))?;

    let sensor = raw
        .validate(&engine)
        .with_context(|| format!("Invalid configuration for '{sensor_name}'"))?;

    let rendered = sensor
        .user_prompt
        .render()
        .with_context(|| "Failed to render user prompt")?;

    println!("System prompt:");
    println!("{}", sensor.system_prompt);
    println!();
    println!("User prompt template:");
    println!("{}", sensor.user_prompt.source());
    println!();
    println!("User prompt:");
    println!("{rendered}");

    Ok(())
}

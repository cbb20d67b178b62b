use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::config::{mask_api_key, validate_all, PlatformConfig};
use crate::hub::{slugify, StateStore};
use crate::template::TemplateEngine;

pub fn handle_check_command(config_path: &Path) -> Result<()> {
    let config = PlatformConfig::load_from_file(config_path)
        .with_context(|| "Failed to load platform config")?;

    let engine = Arc::new(TemplateEngine::new(Arc::new(StateStore::new())));
    let sensors = validate_all(&config.sensors, &engine)
        .with_context(|| "Invalid sensor configuration")?;

    println!("✓ Config is valid: {}", config_path.display());
    println!("  Scan interval: {}s", config.scan_interval);
    println!("  Completion mode: {}", config.api.mode);
    println!("  Seed states: {}", config.states.len());
    println!();

    if sensors.is_empty() {
        println!("No sensors configured. Add a [[sensor]] block to get started.");
        return Ok(());
    }

    for sensor in &sensors {
        println!("  sensor.{}", slugify(&sensor.name));
        println!("    Name: {}", sensor.name);
        println!("    Catalog: {}", sensor.catalog_id);
        println!("    API key: {}", mask_api_key(&sensor.api_key));
    }

    Ok(())
}

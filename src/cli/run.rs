use anyhow::{Context, Result};
use std::path::Path;

use crate::config::PlatformConfig;
use crate::hub::Hub;
use crate::sensor::{setup_platforms, PlatformContext};

pub async fn handle_run_command(config_path: &Path) -> Result<()> {
    let config = PlatformConfig::load_from_file(config_path)
        .with_context(|| "Failed to load platform config")?;

    if config.sensors.is_empty() {
        anyhow::bail!(
            "No [[sensor]] blocks in {}; nothing to run",
            config_path.display()
        );
    }

    let mut hub = Hub::new(config.scan_interval());
    hub.states().extend(config.states.clone());

    let context = PlatformContext::new(hub.run_state(), hub.template_engine(), config.api.clone());
    setup_platforms(&config.sensors, &context, &mut hub)
        .with_context(|| "Invalid sensor configuration")?;

    println!("✓ Registered sensors:");
    for entity_id in hub.entity_ids() {
        println!("  {entity_id}");
    }
    println!("  Polling every {}s, press Ctrl-C to stop", config.scan_interval);

    hub.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    })
    .await;

    for (entity_id, state) in hub.states().snapshot() {
        tracing::debug!(entity_id = %entity_id, state = %state, "Final state");
    }

    Ok(())
}

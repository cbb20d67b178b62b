pub mod check;
pub mod render;
pub mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{ConfigError, PlatformConfig};

#[derive(Parser)]
#[command(name = "yandexgpt-sensor")]
#[command(about = "Poll-driven sensor exposing YandexGPT completions of a templated prompt")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Path to the config file (default: ~/.yandexgpt-sensor/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register all configured sensors and poll them until Ctrl-C
    Run,
    /// Validate the config file without contacting the API
    Check,
    /// Render one sensor's user prompt against the seed states
    Render {
        /// Sensor name as written in the config file
        #[arg(short, long)]
        sensor: String,
    },
}

impl Cli {
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => PlatformConfig::default_path(),
        }
    }

    pub fn run(self) -> Result<()> {
        let config_path = self.config_path()?;

        match self.command {
            Commands::Run => {
                let rt = Runtime::new()?;
                rt.block_on(run::handle_run_command(&config_path))
            }
            Commands::Check => check::handle_check_command(&config_path),
            Commands::Render { sensor } => render::handle_render_command(&config_path, &sensor),
        }
    }
}

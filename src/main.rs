use clap::Parser;
use yandexgpt_sensor::cli::Cli;
use yandexgpt_sensor::logging::{init_logging, parse_level, LoggingConfig};

fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (ignore errors if missing)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if let Some(level) = &cli.log_level {
        match parse_level(level) {
            Some(level) => logging = logging.with_level(level),
            None => anyhow::bail!("Unknown log level '{level}'"),
        }
    }
    init_logging(logging)?;

    cli.run()
}

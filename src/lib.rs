pub mod cli;
pub mod config;
pub mod hub;
pub mod sensor;
pub mod services;
pub mod template;

pub mod env;
pub mod error;
pub mod logging;

pub use error::SensorError;
pub use logging::{init_logging, LoggingConfig};

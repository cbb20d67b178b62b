//! Sensor entities and the platform loader that creates them

pub mod entity;
pub mod platform;

use async_trait::async_trait;

use crate::error::SensorError;

pub use entity::{truncate_state, YandexGptSensor, MAX_STATE_LENGTH, MAX_TOKENS, REQUEST_TIMEOUT};
pub use platform::{setup_platform, setup_platforms, PlatformContext};

/// Contract between an entity and the hub that hosts it
#[async_trait]
pub trait SensorEntity: Send + Sync {
    /// Display label
    fn name(&self) -> &str;

    /// Current value, `None` until the first successful update
    fn native_value(&self) -> Option<&str>;

    /// Whether the hub should call `async_update` on its schedule
    fn should_poll(&self) -> bool {
        true
    }

    /// Refresh the value; errors are returned to the caller untouched
    async fn async_update(&mut self) -> Result<(), SensorError>;
}

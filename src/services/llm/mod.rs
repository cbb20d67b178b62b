//! Completion seam between sensors and the model provider

pub mod traits;
pub mod types;

#[cfg(test)]
pub use traits::MockCompletionClient;
pub use traits::CompletionClient;
pub use types::{
    CompletionOptions, Message, Role, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT,
};

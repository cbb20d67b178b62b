//! Completion client trait definition

use super::types::{CompletionOptions, Message};
use crate::services::yandexgpt::YandexGptError;
use async_trait::async_trait;

/// A handle that turns a message list into one completion
///
/// The sensor owns exactly one of these. Implementations issue one request
/// per call and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a completion for `messages`
    ///
    /// # Returns
    /// * `Ok(String)` - the text of the first alternative, untruncated
    /// * `Err(YandexGptError)` - transport, timeout or API errors
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: CompletionOptions,
    ) -> Result<String, YandexGptError>;

    /// Model identifier used for requests
    fn model_name(&self) -> &str;
}

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::SensorEntity;
use crate::error::SensorError;
use crate::hub::RunStateQuery;
use crate::services::llm::{CompletionClient, CompletionOptions, Message};
use crate::template::Renderable;

/// Longest state string the hub accepts
pub const MAX_STATE_LENGTH: usize = 255;

pub const MAX_TOKENS: u32 = 255;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// First `MAX_STATE_LENGTH` characters of `text`, cut without regard to words
pub fn truncate_state(text: &str) -> String {
    text.chars().take(MAX_STATE_LENGTH).collect()
}

/// Sensor whose value is a YandexGPT completion of a templated prompt
pub struct YandexGptSensor {
    name: String,
    system_prompt: String,
    user_prompt: Box<dyn Renderable>,
    client: Box<dyn CompletionClient>,
    run_state: Arc<dyn RunStateQuery>,
    completion: Option<String>,
}

impl YandexGptSensor {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: Box<dyn Renderable>,
        client: Box<dyn CompletionClient>,
        run_state: Arc<dyn RunStateQuery>,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            user_prompt,
            client,
            run_state,
            completion: None,
        }
    }

    fn completion_options() -> CompletionOptions {
        CompletionOptions::default()
            .with_max_tokens(MAX_TOKENS)
            .with_timeout(REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl SensorEntity for YandexGptSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn native_value(&self) -> Option<&str> {
        self.completion.as_deref()
    }

    async fn async_update(&mut self) -> Result<(), SensorError> {
        // The hub's initial update happens during setup; skipping it saves
        // one paid request per restart.
        let run_state = self.run_state.run_state();
        if run_state.is_not_running() {
            tracing::debug!(sensor = %self.name, %run_state, "Skipping update during startup");
            return Ok(());
        }

        let user_prompt = self.user_prompt.render()?;

        let completion = self
            .client
            .complete(
                vec![
                    Message::system(self.system_prompt.clone()),
                    Message::user(user_prompt),
                ],
                Self::completion_options(),
            )
            .await?;

        self.completion = Some(truncate_state(&completion));

        tracing::debug!(
            sensor = %self.name,
            model = self.client.model_name(),
            received_chars = completion.chars().count(),
            "Sensor updated"
        );

        Ok(())
    }
}

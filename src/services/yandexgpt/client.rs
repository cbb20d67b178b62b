use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use uuid::Uuid;

use super::errors::YandexGptError;
use super::models::{CompletionRequest, CompletionResponse, CompletionResult, Operation};
use crate::services::llm::{CompletionClient, CompletionOptions, Message};

pub const DEFAULT_MODEL: &str = "yandexgpt-lite";
pub const DEFAULT_BASE_URL: &str = "https://llm.api.cloud.yandex.net/foundationModels/v1";
pub const DEFAULT_OPERATIONS_URL: &str = "https://operation.api.cloud.yandex.net";

/// How a completion is obtained from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionMode {
    /// One `POST /completion` answered synchronously
    #[default]
    Immediate,
    /// `POST /completionAsync`, then poll the operation until it is done
    Deferred,
}

impl std::fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionMode::Immediate => write!(f, "immediate"),
            CompletionMode::Deferred => write!(f, "deferred"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct YandexGptConfig {
    pub model: String,
    pub catalog_id: String,
    pub api_key: String,
    pub base_url: String,
    pub operations_url: String,
    pub mode: CompletionMode,
    pub poll_interval: Duration,
}

impl YandexGptConfig {
    /// Config authenticated with a static API key
    pub fn for_api_key(
        model: impl Into<String>,
        catalog_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            catalog_id: catalog_id.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            operations_url: DEFAULT_OPERATIONS_URL.to_string(),
            mode: CompletionMode::default(),
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_operations_url(mut self, operations_url: impl Into<String>) -> Self {
        self.operations_url = operations_url.into();
        self
    }

    pub fn with_mode(mut self, mode: CompletionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// `gpt://<catalog>/<model>/latest`
    pub fn model_uri(&self) -> String {
        format!("gpt://{}/{}/latest", self.catalog_id, self.model)
    }

    pub fn validate(&self) -> Result<(), YandexGptError> {
        if self.catalog_id.is_empty() {
            return Err(YandexGptError::ConfigurationError {
                message: "Catalog id is required".to_string(),
            });
        }

        if self.api_key.is_empty() {
            return Err(YandexGptError::ConfigurationError {
                message: "API key is required".to_string(),
            });
        }

        if self.model.is_empty() {
            return Err(YandexGptError::ConfigurationError {
                message: "Model name cannot be empty".to_string(),
            });
        }

        if self.base_url.is_empty() || self.operations_url.is_empty() {
            return Err(YandexGptError::ConfigurationError {
                message: "API URLs cannot be empty".to_string(),
            });
        }

        if self.poll_interval.is_zero() {
            return Err(YandexGptError::ConfigurationError {
                message: "Poll interval must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Client for the YandexGPT foundation-model API
///
/// Construction performs no I/O; the first request happens on `complete`.
#[derive(Clone)]
pub struct YandexGptClient {
    config: YandexGptConfig,
    client: Client,
}

impl YandexGptClient {
    pub fn new(config: YandexGptConfig) -> Result<Self, YandexGptError> {
        config.validate()?;

        let client = Client::builder()
            .build()
            .map_err(|e| YandexGptError::ConfigurationError {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &YandexGptConfig {
        &self.config
    }

    /// Request a completion and return the full result
    pub async fn create_completion(
        &self,
        messages: Vec<Message>,
        options: &CompletionOptions,
    ) -> Result<CompletionResult, YandexGptError> {
        let request = CompletionRequest::new(self.config.model_uri(), messages, options);
        let timeout_ms = options.timeout.as_millis() as u64;

        let result = match self.config.mode {
            CompletionMode::Immediate => {
                timeout(options.timeout, self.complete_immediate(&request, options))
                    .await
                    .map_err(|_| YandexGptError::Timeout { timeout_ms })??
            }
            CompletionMode::Deferred => {
                timeout(options.timeout, self.complete_deferred(&request, options))
                    .await
                    .map_err(|_| YandexGptError::Timeout { timeout_ms })??
            }
        };

        result
            .validate()
            .map_err(|message| YandexGptError::InvalidResponse { message })?;

        tracing::debug!(
            model = %self.config.model,
            total_tokens = ?result.total_tokens(),
            status = ?result.status(),
            "Completion received"
        );

        Ok(result)
    }

    async fn complete_immediate(
        &self,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> Result<CompletionResult, YandexGptError> {
        let url = format!("{}/completion", self.config.base_url);
        let builder = self.client.post(&url).json(request);
        let response: CompletionResponse = self.send(builder, options).await?;
        Ok(response.result)
    }

    async fn complete_deferred(
        &self,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> Result<CompletionResult, YandexGptError> {
        let url = format!("{}/completionAsync", self.config.base_url);
        let builder = self.client.post(&url).json(request);
        let mut operation: Operation = self.send(builder, options).await?;
        let started = Instant::now();

        tracing::debug!(operation_id = %operation.id, "Completion operation accepted");

        loop {
            if operation.done {
                return Self::finish_operation(operation);
            }

            tokio::time::sleep(self.config.poll_interval).await;

            let remaining = options.timeout.saturating_sub(started.elapsed());
            let url = format!(
                "{}/operations/{}",
                self.config.operations_url, operation.id
            );
            let builder = self.client.get(&url);
            operation = self
                .send(builder, &options.clone().with_timeout(remaining))
                .await?;
        }
    }

    fn finish_operation(operation: Operation) -> Result<CompletionResult, YandexGptError> {
        if let Some(error) = operation.error {
            return Err(YandexGptError::OperationFailed {
                operation_id: operation.id,
                code: error.code,
                message: error.message,
            });
        }

        operation
            .response
            .ok_or_else(|| YandexGptError::InvalidResponse {
                message: format!("Operation {} finished without a response", operation.id),
            })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        options: &CompletionOptions,
    ) -> Result<T, YandexGptError> {
        let request_id = Uuid::new_v4();
        let timeout_ms = options.timeout.as_millis() as u64;

        tracing::debug!(
            request_id = %request_id,
            catalog_id = %self.config.catalog_id,
            "Sending YandexGPT request"
        );

        let response = builder
            .header("Authorization", format!("Api-Key {}", self.config.api_key))
            .header("x-folder-id", &self.config.catalog_id)
            .header("x-client-request-id", request_id.to_string())
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| YandexGptError::from_reqwest_error(e, timeout_ms))?;

        self.handle_response(response, timeout_ms).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        timeout_ms: u64,
    ) -> Result<T, YandexGptError> {
        let status = response.status();

        if status.is_success() {
            let response_text = response
                .text()
                .await
                .map_err(|e| YandexGptError::from_reqwest_error(e, timeout_ms))?;

            serde_json::from_str(&response_text).map_err(|e| YandexGptError::ParseError {
                message: format!("Failed to parse response: {e}"),
            })
        } else {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            Err(YandexGptError::from_status_and_body(status, &error_body))
        }
    }
}

#[async_trait]
impl CompletionClient for YandexGptClient {
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: CompletionOptions,
    ) -> Result<String, YandexGptError> {
        let result = self.create_completion(messages, &options).await?;

        result
            .extract_text()
            .ok_or_else(|| YandexGptError::InvalidResponse {
                message: "No text content in response".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

use serde::{Deserialize, Deserializer, Serialize};

use crate::services::llm::{CompletionOptions, Message};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model_uri: String,
    pub completion_options: CompletionOptionsBody,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptionsBody {
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model_uri: String, messages: Vec<Message>, options: &CompletionOptions) -> Self {
        Self {
            model_uri,
            completion_options: CompletionOptionsBody {
                stream: false,
                temperature: options.temperature,
                max_tokens: options.max_tokens,
            },
            messages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompletionResponse {
    pub result: CompletionResult,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    pub usage: Option<Usage>,
    pub model_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Alternative {
    pub message: Message,
    pub status: Option<String>,
}

/// Token counts; the API encodes int64 values as JSON strings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, deserialize_with = "token_count")]
    pub input_text_tokens: Option<u64>,
    #[serde(default, deserialize_with = "token_count")]
    pub completion_tokens: Option<u64>,
    #[serde(default, deserialize_with = "token_count")]
    pub total_tokens: Option<u64>,
}

fn token_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Option::<Count>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Count::Number(n)) => Ok(Some(n)),
        Some(Count::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl CompletionResult {
    /// Text of the first alternative
    pub fn extract_text(&self) -> Option<String> {
        self.alternatives
            .first()
            .map(|alternative| alternative.message.text.clone())
    }

    pub fn total_tokens(&self) -> Option<u64> {
        self.usage.as_ref().and_then(|usage| usage.total_tokens)
    }

    pub fn status(&self) -> Option<&str> {
        self.alternatives
            .first()
            .and_then(|alternative| alternative.status.as_deref())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.alternatives.is_empty() {
            return Err("No alternatives in response".to_string());
        }
        Ok(())
    }
}

/// Long-running operation returned by `completionAsync`
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    #[serde(default)]
    pub done: bool,
    pub error: Option<OperationError>,
    pub response: Option<CompletionResult>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OperationError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

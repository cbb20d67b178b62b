pub mod client;
pub mod errors;
pub mod models;

pub use client::{
    CompletionMode, YandexGptClient, YandexGptConfig, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_OPERATIONS_URL,
};
pub use errors::YandexGptError;
pub use models::{
    Alternative, CompletionOptionsBody, CompletionRequest, CompletionResponse, CompletionResult,
    Operation, OperationError, Usage,
};

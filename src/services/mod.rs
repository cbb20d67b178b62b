pub mod llm;
pub mod yandexgpt;

pub use llm::{CompletionClient, CompletionOptions, Message, Role};
pub use yandexgpt::{CompletionMode, YandexGptClient, YandexGptConfig, YandexGptError};

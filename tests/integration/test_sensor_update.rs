use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use yandexgpt_sensor::hub::{RunState, RunStateHandle, StateStore};
use yandexgpt_sensor::sensor::{SensorEntity, YandexGptSensor, MAX_STATE_LENGTH};
use yandexgpt_sensor::services::llm::{CompletionClient, CompletionOptions, Message, Role};
use yandexgpt_sensor::services::yandexgpt::YandexGptError;
use yandexgpt_sensor::template::{PromptTemplate, TemplateEngine};

type Recorded = Arc<Mutex<Vec<(Vec<Message>, CompletionOptions)>>>;

/// Client that replays queued outcomes and records every call
struct FakeClient {
    replies: Mutex<VecDeque<Result<String, YandexGptError>>>,
    calls: Recorded,
}

impl FakeClient {
    fn new(replies: Vec<Result<String, YandexGptError>>) -> (Self, Recorded) {
        let calls = Recorded::default();
        let client = Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::clone(&calls),
        };
        (client, calls)
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: CompletionOptions,
    ) -> Result<String, YandexGptError> {
        self.calls.lock().unwrap().push((messages, options));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

struct Fixture {
    states: Arc<StateStore>,
    run_state: Arc<RunStateHandle>,
    calls: Recorded,
    sensor: YandexGptSensor,
}

fn fixture(replies: Vec<Result<String, YandexGptError>>) -> Fixture {
    let states = Arc::new(StateStore::new());
    let engine = Arc::new(TemplateEngine::new(Arc::clone(&states)));
    let prompt = PromptTemplate::new(
        "It is {{ states('sensor.outside') }} outside. What should I wear?",
        engine,
    )
    .unwrap();
    let run_state = Arc::new(RunStateHandle::new(RunState::Running));
    let (client, calls) = FakeClient::new(replies);

    let sensor = YandexGptSensor::new(
        "Outfit",
        "Reply in five words.",
        Box::new(prompt),
        Box::new(client),
        run_state.clone(),
    );

    Fixture {
        states,
        run_state,
        calls,
        sensor,
    }
}

#[tokio::test]
async fn test_update_renders_current_states() {
    let mut f = fixture(vec![Ok("Coat and scarf".to_string())]);
    f.states.set("sensor.outside", "-5".to_string());

    f.sensor.async_update().await.unwrap();

    assert_eq!(f.sensor.native_value(), Some("Coat and scarf"));
    let calls = f.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (messages, options) = &calls[0];
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[0].text, "Reply in five words.");
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].text, "It is -5 outside. What should I wear?");
    assert_eq!(options.max_tokens, 255);
    assert_eq!(options.timeout, Duration::from_secs(30));
}

#[tokio::test]
async fn test_each_update_sees_fresh_state() {
    let mut f = fixture(vec![Ok("Coat".to_string()), Ok("T-shirt".to_string())]);

    f.states.set("sensor.outside", "-5".to_string());
    f.sensor.async_update().await.unwrap();
    f.states.set("sensor.outside", "28".to_string());
    f.sensor.async_update().await.unwrap();

    assert_eq!(f.sensor.native_value(), Some("T-shirt"));
    let calls = f.calls.lock().unwrap();
    assert_eq!(calls[1].0[1].text, "It is 28 outside. What should I wear?");
}

#[tokio::test]
async fn test_guard_skips_only_while_not_running() {
    let mut f = fixture(vec![Ok("Starting answer".to_string())]);

    f.run_state.set(RunState::NotRunning);
    f.sensor.async_update().await.unwrap();
    assert!(f.calls.lock().unwrap().is_empty());
    assert_eq!(f.sensor.native_value(), None);

    f.run_state.set(RunState::Starting);
    f.sensor.async_update().await.unwrap();
    assert_eq!(f.calls.lock().unwrap().len(), 1);
    assert_eq!(f.sensor.native_value(), Some("Starting answer"));
}

#[tokio::test]
async fn test_value_capped_at_255_characters() {
    let mut f = fixture(vec![Ok("ю".repeat(400))]);

    f.sensor.async_update().await.unwrap();

    assert_eq!(
        f.sensor.native_value().unwrap().chars().count(),
        MAX_STATE_LENGTH
    );
}

#[tokio::test]
async fn test_failure_propagates_and_keeps_last_value() {
    let mut f = fixture(vec![
        Ok("First".to_string()),
        Err(YandexGptError::RateLimitExceeded {
            message: "slow down".to_string(),
        }),
    ]);

    f.sensor.async_update().await.unwrap();
    let err = f.sensor.async_update().await.unwrap_err();

    assert!(err.is_completion_error());
    assert!(err.completion_error().unwrap().is_rate_limit_error());
    assert_eq!(f.sensor.native_value(), Some("First"));
}

use mockito::Matcher;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use yandexgpt_sensor::services::llm::{CompletionClient, CompletionOptions, Message};
use yandexgpt_sensor::services::yandexgpt::{
    CompletionMode, YandexGptClient, YandexGptConfig, DEFAULT_MODEL,
};

const CATALOG_ID: &str = "b1gtestcatalog";
const API_KEY: &str = "AQVNtestkey";

fn config(base_url: &str) -> YandexGptConfig {
    YandexGptConfig::for_api_key(DEFAULT_MODEL, CATALOG_ID, API_KEY)
        .with_base_url(base_url)
        .with_operations_url(base_url)
}

fn messages() -> Vec<Message> {
    vec![
        Message::system("Answer in one sentence."),
        Message::user("What is the weather like?"),
    ]
}

fn options() -> CompletionOptions {
    CompletionOptions::default()
        .with_max_tokens(255)
        .with_timeout(Duration::from_secs(5))
}

fn completion_body(text: &str) -> String {
    json!({
        "result": {
            "alternatives": [{
                "message": {"role": "assistant", "text": text},
                "status": "ALTERNATIVE_STATUS_FINAL"
            }],
            "usage": {
                "inputTextTokens": "19",
                "completionTokens": "7",
                "totalTokens": "26"
            },
            "modelVersion": "23.10.2024"
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_immediate_completion_request_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/completion")
        .match_header("authorization", "Api-Key AQVNtestkey")
        .match_header("x-folder-id", CATALOG_ID)
        .match_header("x-client-request-id", Matcher::Regex("^[0-9a-f-]{36}$".to_string()))
        .match_body(Matcher::PartialJson(json!({
            "modelUri": "gpt://b1gtestcatalog/yandexgpt-lite/latest",
            "completionOptions": {"stream": false, "maxTokens": 255},
            "messages": [
                {"role": "system", "text": "Answer in one sentence."},
                {"role": "user", "text": "What is the weather like?"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("Sunny and warm."))
        .expect(1)
        .create_async()
        .await;

    let client = YandexGptClient::new(config(&server.url())).unwrap();
    let text = client.complete(messages(), options()).await.unwrap();

    assert_eq!(text, "Sunny and warm.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_completion_result_exposes_usage() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/completion")
        .with_status(200)
        .with_body(completion_body("Hi"))
        .create_async()
        .await;

    let client = YandexGptClient::new(config(&server.url())).unwrap();
    let result = client.create_completion(messages(), &options()).await.unwrap();

    assert_eq!(result.extract_text().as_deref(), Some("Hi"));
    assert_eq!(result.total_tokens(), Some(26));
    assert_eq!(result.status(), Some("ALTERNATIVE_STATUS_FINAL"));
}

#[tokio::test]
async fn test_error_statuses_are_classified() {
    let cases = [
        (401, r#"{"error": {"grpcCode": 16, "httpCode": 401, "message": "Unknown api key"}}"#),
        (429, r#"{"error": {"message": "Too many requests"}}"#),
        (500, r#"{"error": {"message": "Internal"}}"#),
        (400, r#"{"error": {"message": "Bad modelUri"}}"#),
    ];

    for (status, body) in cases {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/completion")
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;

        let client = YandexGptClient::new(config(&server.url())).unwrap();
        let err = client.complete(messages(), options()).await.unwrap_err();

        match status {
            401 => assert!(err.is_authentication_error(), "{err}"),
            429 => assert!(err.is_rate_limit_error(), "{err}"),
            500 => assert!(err.is_server_error(), "{err}"),
            _ => assert!(err.to_string().contains("Bad modelUri"), "{err}"),
        }
    }
}

#[tokio::test]
async fn test_empty_alternatives_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/completion")
        .with_status(200)
        .with_body(r#"{"result": {"alternatives": []}}"#)
        .create_async()
        .await;

    let client = YandexGptClient::new(config(&server.url())).unwrap();
    let err = client.complete(messages(), options()).await.unwrap_err();

    assert!(err.is_invalid_response_error());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/completion")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = YandexGptClient::new(config(&server.url())).unwrap();
    let err = client.complete(messages(), options()).await.unwrap_err();

    assert!(err.is_parse_error());
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // Accept and hold connections without ever answering
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = YandexGptClient::new(config(&format!("http://{address}"))).unwrap();
    let err = client
        .complete(
            messages(),
            options().with_timeout(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout_error(), "{err}");
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let client = YandexGptClient::new(config("http://127.0.0.1:1")).unwrap();
    let err = client.complete(messages(), options()).await.unwrap_err();

    assert!(err.is_network_error(), "{err}");
}

#[tokio::test]
async fn test_deferred_mode_polls_operation() {
    let mut server = mockito::Server::new_async().await;
    let submit = server
        .mock("POST", "/completionAsync")
        .match_header("x-folder-id", CATALOG_ID)
        .with_status(200)
        .with_body(r#"{"id": "d7qop1", "done": false}"#)
        .expect(1)
        .create_async()
        .await;
    let poll = server
        .mock("GET", "/operations/d7qop1")
        .match_header("authorization", "Api-Key AQVNtestkey")
        .with_status(200)
        .with_body(
            json!({
                "id": "d7qop1",
                "done": true,
                "response": {
                    "alternatives": [{
                        "message": {"role": "assistant", "text": "Deferred answer"},
                        "status": "ALTERNATIVE_STATUS_FINAL"
                    }],
                    "usage": {"inputTextTokens": "3", "completionTokens": "2", "totalTokens": "5"}
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = YandexGptClient::new(
        config(&server.url())
            .with_mode(CompletionMode::Deferred)
            .with_poll_interval(Duration::from_millis(10)),
    )
    .unwrap();
    let text = client.complete(messages(), options()).await.unwrap();

    assert_eq!(text, "Deferred answer");
    submit.assert_async().await;
    poll.assert_async().await;
}

#[tokio::test]
async fn test_deferred_operation_error_surfaces() {
    let mut server = mockito::Server::new_async().await;
    let _submit = server
        .mock("POST", "/completionAsync")
        .with_status(200)
        .with_body(
            r#"{"id": "op2", "done": true, "error": {"code": 3, "message": "prompt too long"}}"#,
        )
        .create_async()
        .await;

    let client = YandexGptClient::new(
        config(&server.url()).with_mode(CompletionMode::Deferred),
    )
    .unwrap();
    let err = client.complete(messages(), options()).await.unwrap_err();

    assert!(err.to_string().contains("prompt too long"), "{err}");
}

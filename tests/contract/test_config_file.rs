use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use yandexgpt_sensor::config::{ConfigError, PlatformConfig};
use yandexgpt_sensor::services::yandexgpt::CompletionMode;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config_file_loads() {
    let file = write_config(
        r#"
scan_interval = 600

[api]
base_url = "http://127.0.0.1:8080/foundationModels/v1"
mode = "deferred"
poll_interval_ms = 500

[states]
"sensor.outside_temperature" = "21.5"

[[sensor]]
name = "Morning briefing"
catalog_id = "b1gcatalog"
api_key = "AQVNsecret"
system_prompt = "You are a concise assistant."
user_prompt = "It is {{ states('sensor.outside_temperature') }} degrees. What should I wear?"

[[sensor]]
catalog_id = "b1gcatalog"
api_key = "AQVNsecret"
system_prompt = "Reply with one word."
user_prompt = "Mood?"
"#,
    );

    let config = PlatformConfig::load_from_file(file.path()).unwrap();

    assert_eq!(config.scan_interval(), Duration::from_secs(600));
    assert_eq!(config.api.mode, CompletionMode::Deferred);
    assert_eq!(config.api.poll_interval_ms, 500);
    assert_eq!(
        config.states.get("sensor.outside_temperature").map(String::as_str),
        Some("21.5")
    );
    assert_eq!(config.sensors.len(), 2);
    assert_eq!(config.sensors[0].name.as_deref(), Some("Morning briefing"));
    assert_eq!(config.sensors[1].name, None);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = PlatformConfig::load_from_file(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let file = write_config("scan_interval = [not toml");

    let err = PlatformConfig::load_from_file(file.path()).unwrap_err();

    match err {
        ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_unknown_mode_rejected() {
    let file = write_config("[api]\nmode = \"streaming\"\n");

    let err = PlatformConfig::load_from_file(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

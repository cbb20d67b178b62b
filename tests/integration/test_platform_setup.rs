use std::time::Duration;
use yandexgpt_sensor::config::{ApiSettings, PlatformConfig, RawSensorConfig};
use yandexgpt_sensor::hub::{Hub, STATE_UNKNOWN};
use yandexgpt_sensor::sensor::{setup_platform, setup_platforms, PlatformContext};

fn raw(name: Option<&str>) -> RawSensorConfig {
    RawSensorConfig {
        name: name.map(str::to_string),
        catalog_id: Some("b1gcatalog".to_string()),
        api_key: Some("AQVNsecret".to_string()),
        system_prompt: Some("Be brief.".to_string()),
        user_prompt: Some("Temperature is {{ states('sensor.outside') }}".to_string()),
    }
}

fn context(hub: &Hub, base_url: &str) -> PlatformContext {
    let api = ApiSettings {
        base_url: Some(base_url.to_string()),
        operations_url: Some(base_url.to_string()),
        ..ApiSettings::default()
    };
    PlatformContext::new(hub.run_state(), hub.template_engine(), api)
}

#[tokio::test]
async fn test_setup_sends_no_requests() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut hub = Hub::new(Duration::from_secs(30));
    let ctx = context(&hub, &server.url());
    setup_platform(&raw(Some("Morning briefing")), &ctx, &mut hub).unwrap();

    assert_eq!(hub.entity_ids(), vec!["sensor.morning_briefing"]);
    assert_eq!(
        hub.states().get("sensor.morning_briefing").as_deref(),
        Some(STATE_UNKNOWN)
    );
    assert_eq!(hub.entity("sensor.morning_briefing").unwrap().native_value(), None);
    mock.assert_async().await;
}

#[test]
fn test_duplicate_names_get_distinct_ids() {
    let mut hub = Hub::new(Duration::from_secs(30));
    let ctx = context(&hub, "http://127.0.0.1:9");

    let count = setup_platforms(&[raw(None), raw(None), raw(None)], &ctx, &mut hub).unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        hub.entity_ids(),
        vec![
            "sensor.yandexgpt_response",
            "sensor.yandexgpt_response_2",
            "sensor.yandexgpt_response_3"
        ]
    );
}

#[test]
fn test_invalid_block_leaves_hub_empty() {
    let mut missing_key = raw(Some("Broken"));
    missing_key.api_key = None;

    let mut hub = Hub::new(Duration::from_secs(30));
    let ctx = context(&hub, "http://127.0.0.1:9");
    let err = setup_platforms(&[raw(Some("Fine")), missing_key], &ctx, &mut hub).unwrap_err();

    assert!(err.is_missing_field());
    assert_eq!(err.field(), Some("api_key"));
    assert!(hub.entity_ids().is_empty());
}

#[test]
fn test_setup_from_config_text() {
    let config = PlatformConfig::from_toml_str(
        r#"
[[sensor]]
name = "Dinner idea"
catalog_id = "b1gcatalog"
api_key = "AQVNsecret"
system_prompt = "Suggest one dish."
user_prompt = "{% if is_state('sensor.season', 'winter') %}Something warm{% else %}Something light{% endif %}"
"#,
    )
    .unwrap();

    let mut hub = Hub::new(config.scan_interval());
    let ctx = PlatformContext::new(hub.run_state(), hub.template_engine(), config.api.clone());
    setup_platforms(&config.sensors, &ctx, &mut hub).unwrap();

    assert_eq!(hub.entity_ids(), vec!["sensor.dinner_idea"]);
    assert_eq!(hub.is_available("sensor.dinner_idea"), Some(true));
}

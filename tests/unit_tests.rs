use mockito::Matcher;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};
use slack_messaging_rs::{
    Attachment, AttachmentField, Block, Configuration, Error, Message, Payload, SlackMessaging,
    ToPayload,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tests touching the global configuration run one at a time
static GLOBAL_CONFIG: Mutex<()> = Mutex::new(());

/// Take the global configuration lock and reset it to defaults
fn fresh_configuration() -> MutexGuard<'static, ()> {
    let guard = GLOBAL_CONFIG.lock().unwrap_or_else(|e| e.into_inner());
    SlackMessaging::configure(|config| *config = Configuration::default());
    guard
}

fn object(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test]
fn test_configuration() {
    init_logger();
    let _guard = fresh_configuration();

    SlackMessaging::configure(|config| {
        config.set_token("xoxb-test");
        config.set_webhook_url("https://hooks.slack.com/services/T0/B0/XXX");
    });

    // Verify configuration
    let instance = Configuration::get_instance();
    let config = instance.lock().unwrap();

    assert_eq!(config.token().unwrap(), "xoxb-test");
    assert_eq!(
        config.webhook_url().unwrap(),
        "https://hooks.slack.com/services/T0/B0/XXX"
    );
    assert_eq!(config.api_base_url(), "https://slack.com/api");
    assert!(config.validate().is_ok());
}

#[test]
fn test_wire_payload_shape() {
    let attachment = Attachment::from_attributes([
        ("fallback", json!("Deploy v2 finished")),
        ("color", json!("good")),
        ("author-name", json!("ci")),
        ("Title Link", json!("https://ci.example.com/42")),
        ("fields", json!([{"title": "Env", "value": "prod", "short": true}])),
        ("nonsense", json!(true)),
    ])
    .unwrap()
    .add_field(AttachmentField::new("Duration", "3m"))
    .add_block(Block::with_custom("context", object(json!({"elements": []}))))
    .custom(object(json!({"mrkdwn_in": ["text"], "color": "danger"})));

    let message = Message::new("C123")
        .text("Deploy finished")
        .from("deploy-bot")
        .icon_with_type("https://example.com/bot.png", "icon_url")
        .unwrap()
        .attach(attachment)
        .add_block(Block::section("*v2* is live"))
        .custom(object(json!({"channel": "OVERRIDDEN", "unfurl_links": false})));

    assert_eq!(
        Value::Object(message.to_payload()),
        json!({
            "text": "Deploy finished",
            "channel": "C123",
            "username": "deploy-bot",
            "icon_url": "https://example.com/bot.png",
            "attachments": [{
                "fallback": "Deploy v2 finished",
                "color": "good",
                "author_name": "ci",
                "title_link": "https://ci.example.com/42",
                "fields": [
                    {"title": "Env", "value": "prod", "short": true},
                    {"title": "Duration", "value": "3m", "short": false}
                ],
                "blocks": [{"type": "context", "elements": []}],
                "mrkdwn_in": ["text"]
            }],
            "blocks": [{"type": "section", "text": {"type": "mrkdwn", "text": "*v2* is live"}}],
            "unfurl_links": false
        })
    );
}

#[test]
fn test_invalid_icon_type() {
    let result = Message::new("C123").icon_with_type(":x:", "emoji");
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_text_less_message_serializes() {
    let message = Message::new("C123");
    assert!(matches!(message.validate(), Err(Error::MissingContent)));

    let payload = message.to_payload();
    assert_eq!(payload["channel"], "C123");
    assert!(!payload.contains_key("text"));
}

#[test]
fn test_webhook_and_api_delivery() {
    init_logger();

    let mut server = mockito::Server::new();
    let message = Message::new("C123").text("hello");
    let expected = Value::Object(message.to_payload());

    let hook = server
        .mock("POST", "/services/T0/B0/XXX")
        .match_body(Matcher::Json(expected.clone()))
        .with_body("ok")
        .create();
    let api = server
        .mock("POST", "/chat.postMessage")
        .match_header("authorization", "Bearer xoxb-test")
        .match_body(Matcher::Json(expected))
        .with_body(r#"{"ok": true, "channel": "C123", "ts": "1.1"}"#)
        .create();

    let body = slack_messaging_rs::WebhookClient::new()
        .send_message(&format!("{}/services/T0/B0/XXX", server.url()), &message)
        .unwrap();
    assert_eq!(body, "ok");

    let response = slack_messaging_rs::SlackClient::new("xoxb-test")
        .with_base_url(server.url())
        .post_message(&message)
        .unwrap();
    assert!(response.ok);
    assert_eq!(response.data["channel"], "C123");

    hook.assert();
    api.assert();
}

#[test]
fn test_facade_requires_configuration() {
    init_logger();
    let _guard = fresh_configuration();

    let message = Message::new("C123").text("hello");

    assert!(matches!(
        SlackMessaging::send_webhook(&message),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        SlackMessaging::post_message(&message),
        Err(Error::Configuration(_))
    ));

    // A webhook alone doesn't give the Web API a token.
    SlackMessaging::configure(|config| {
        config.set_webhook_url("https://hooks.slack.com/services/T0/B0/XXX");
    });
    assert!(matches!(
        SlackMessaging::post_message(&message),
        Err(Error::Configuration(_))
    ));

    // And a token alone gives the webhook no URL.
    SlackMessaging::configure(|config| {
        *config = Configuration::default();
        config.set_token("xoxb-test");
    });
    assert!(matches!(
        SlackMessaging::send_webhook(&message),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_facade_delivery() {
    init_logger();
    let _guard = fresh_configuration();

    let mut server = mockito::Server::new();
    let message = Message::new("C123").text("hello");
    let expected = Value::Object(message.to_payload());

    let hook = server
        .mock("POST", "/services/T0/B0/XXX")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(expected.clone()))
        .with_body("ok")
        .create();
    let api = server
        .mock("POST", "/api/chat.postMessage")
        .match_header("authorization", "Bearer xoxb-facade")
        .match_body(Matcher::Json(expected))
        .with_body(r#"{"ok": true, "channel": "C123", "ts": "2.2"}"#)
        .create();

    let url = server.url();
    SlackMessaging::configure(|config| {
        config.set_token("xoxb-facade");
        config.set_webhook_url(format!("{}/services/T0/B0/XXX", url));
        config.set_api_base_url(format!("{}/api/", url));
    });

    assert_eq!(SlackMessaging::send_webhook(&message).unwrap(), "ok");

    let response = SlackMessaging::post_message(&message).unwrap();
    assert!(response.ok);
    assert_eq!(response.data["ts"], "2.2");

    hook.assert();
    api.assert();
}

use bends::slack::SlackWebhook;
use bends_core::contract::DigestSink;
use bends_core::digest::PresentationBlock;
use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn posts_blocks_to_team_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/bends"))
        .and(body_json(json!({
            "blocks": [
                {"type": "header", "text": {"type": "plain_text", "text": "Build Error Notification Dispatch System"}},
                {"type": "divider"}
            ],
            "channel": "team-core-bots"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let sink = SlackWebhook::new(format!("{}/hooks/bends", server.uri()));
    sink.deliver(
        "core",
        vec![
            PresentationBlock::header("Build Error Notification Dispatch System"),
            PresentationBlock::divider(),
        ],
    )
    .await
    .expect("delivery succeeds");
}

#[tokio::test]
async fn rejected_post_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_blocks"))
        .mount(&server)
        .await;

    let sink = SlackWebhook::new(server.uri());
    assert!(sink.deliver("core", vec![PresentationBlock::divider()]).await.is_err());
}

#[test]
#[serial]
fn missing_webhook_url_is_a_configuration_error() {
    std::env::remove_var("SLACK_WEBHOOK_URL");
    assert!(SlackWebhook::from_env().is_err());

    std::env::set_var("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X");
    assert!(SlackWebhook::from_env().is_ok());
    std::env::remove_var("SLACK_WEBHOOK_URL");
}

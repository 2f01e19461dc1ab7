//! Mock webhook helpers
//!
//! Every mock answers `POST /hook`; the notifier under test is pointed at
//! `{server}/hook`.

use std::time::Duration;

use courier_core::RetryPolicy;
use courier_notify::WebhookNotifier;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const HOOK_PATH: &str = "/hook";

/// Notifier aimed at the mock server's hook endpoint
pub fn notifier_for(server: &MockServer) -> WebhookNotifier {
    WebhookNotifier::new(format!("{}{}", server.uri(), HOOK_PATH)).unwrap()
}

/// Three attempts with millisecond waits, to keep tests fast on a real clock
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(10), 2.0).unwrap()
}

pub fn ok_reply() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": "success"}))
}

/// Reply with `template` to every POST carrying the text payload `text`
pub async fn mock_text_reply(server: &MockServer, text: &str, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .and(body_json(json!({"msg_type": "text", "content": {"text": text}})))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Fail `fail_count` times with `status`, then accept
pub async fn mock_flaky_hook(server: &MockServer, status: u16, fail_count: u64) {
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ok_reply())
        .mount(server)
        .await;
}

/// Always answer with `template`
pub async fn mock_hook(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

//! Text delivery to bot webhooks
//!
//! Posts `{"msg_type":"text","content":{"text":...}}` and classifies every
//! failure into a courier [`ErrorKind`](courier_core::ErrorKind) so the retry
//! executor can decide what to re-send.

use std::time::Duration;

use courier_core::retry::{RetryError, RetryExecutorBuilder, TracingObserver};
use courier_core::{Error, Result, RetryPolicy};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Request timeout applied to every webhook call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    msg_type: &'static str,
    content: TextContent<'a>,
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    text: &'a str,
}

/// Bot reply; older endpoints use `StatusCode`/`StatusMessage`, newer ones `code`/`msg`
#[derive(Debug, Deserialize)]
struct WebhookReply {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(rename = "StatusCode", default)]
    status_code: Option<i64>,
    #[serde(rename = "StatusMessage", default)]
    status_message: Option<String>,
}

impl WebhookReply {
    fn is_success(&self) -> bool {
        self.status_code == Some(0) || self.code == Some(0)
    }

    fn message(&self) -> &str {
        self.msg
            .as_deref()
            .or(self.status_message.as_deref())
            .unwrap_or("no message")
    }

    fn code(&self) -> Option<i64> {
        self.code.or(self.status_code)
    }
}

/// Sends text messages to a single webhook URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier with the default 10 s timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a notifier with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("courier/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::notification_with("failed to create HTTP client", e))?;

        Ok(Self {
            client,
            url: url.into().trim().to_string(),
        })
    }

    /// Post one text message
    ///
    /// Transport failures, timeouts and 408/425/429/5xx replies are
    /// `Network` errors. A missing URL, any other non-2xx reply or a
    /// non-zero bot code is a `Notification` error. A 2xx reply that is not
    /// JSON is a `DataProcessing` error.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::notification("webhook URL is not configured"));
        }

        let payload = TextMessage {
            msg_type: "text",
            content: TextContent { text },
        };

        debug!(chars = text.chars().count(), "Posting text message to webhook");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::network_with(transport_message(&e), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network_with("failed to read webhook response", e))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let reply: WebhookReply = serde_json::from_str(&body).map_err(|e| {
            Error::data_processing_with(
                format!("webhook returned a non-JSON body: {}", truncate(&body, 200)),
                e,
            )
        })?;

        if !reply.is_success() {
            return Err(Error::notification(match reply.code() {
                Some(code) => format!("webhook rejected the message (code {}): {}", code, reply.message()),
                None => format!("webhook reply carried no status code: {}", reply.message()),
            }));
        }

        info!("Webhook message delivered");
        Ok(())
    }

    /// Post one text message, retrying network failures under `policy`
    pub async fn send_with_retry(
        &self,
        text: &str,
        policy: &RetryPolicy,
    ) -> std::result::Result<(), RetryError<Error>> {
        RetryExecutorBuilder::new()
            .with_policy(policy.clone())
            .with_observer(TracingObserver::new("webhook delivery"))
            .build()
            .execute(move || self.send_text(text))
            .await
    }
}

fn transport_message(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "webhook request timed out"
    } else if err.is_connect() {
        "could not connect to webhook"
    } else {
        "webhook request failed"
    }
}

/// Map a non-2xx status to the matching error kind
fn status_error(status: StatusCode, body: &str) -> Error {
    let message = format!("webhook responded with {}: {}", status, truncate(body, 200));

    if is_transient_status(status) {
        Error::network(message)
    } else {
        Error::notification(message)
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    // 408 Request Timeout, 425 Too Early, 429 Too Many Requests
    status.is_server_error() || matches!(status.as_u16(), 408 | 425 | 429)
}

fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::ErrorKind;

    #[test]
    fn test_payload_shape() {
        let payload = TextMessage {
            msg_type: "text",
            content: TextContent { text: "hello" },
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"msg_type":"text","content":{"text":"hello"}}"#
        );
    }

    #[test]
    fn test_status_classification() {
        for status in [408, 425, 429, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(status).unwrap();
            assert_eq!(status_error(status, "").kind(), ErrorKind::Network, "{}", status);
        }
        for status in [400, 401, 403, 404, 410] {
            let status = StatusCode::from_u16(status).unwrap();
            assert_eq!(
                status_error(status, "").kind(),
                ErrorKind::Notification,
                "{}",
                status
            );
        }
    }

    #[test]
    fn test_reply_success_either_field() {
        let reply: WebhookReply = serde_json::from_str(r#"{"code":0,"msg":"success"}"#).unwrap();
        assert!(reply.is_success());

        let reply: WebhookReply =
            serde_json::from_str(r#"{"StatusCode":0,"StatusMessage":"success"}"#).unwrap();
        assert!(reply.is_success());

        let reply: WebhookReply =
            serde_json::from_str(r#"{"code":19001,"msg":"param invalid"}"#).unwrap();
        assert!(!reply.is_success());
        assert_eq!(reply.message(), "param invalid");
        assert_eq!(reply.code(), Some(19001));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("  short  ", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("推送消息", 2), "推送...");
    }

    #[tokio::test]
    async fn test_empty_url_is_notification_error() {
        let notifier = WebhookNotifier::new("   ").unwrap();
        let err = notifier.send_text("hi").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Notification);
    }
}

//! Webhook commands

use anyhow::{anyhow, bail, Result};
use camino::Utf8Path;
use courier_core::validate::validate_webhook_url;
use courier_core::{ConfigValidator, LoadedConfig, RetryPolicy, ValidationMode};
use courier_notify::WebhookNotifier;
use tracing::debug;

use crate::cli::{WebhookCommands, WebhookTestArgs};
use crate::output;

pub async fn run(cmd: WebhookCommands, config_path: &Utf8Path) -> Result<()> {
    match cmd {
        WebhookCommands::Test(args) => test(args, config_path).await,
    }
}

async fn test(args: WebhookTestArgs, config_path: &Utf8Path) -> Result<()> {
    // A config file is optional here, but when present it must be valid
    let loaded = if config_path.exists() {
        Some(LoadedConfig::load_and_validate(
            config_path,
            &[],
            &ConfigValidator::new(),
            ValidationMode::FailFast,
        )?)
    } else {
        debug!("No config file at {}, using defaults", config_path);
        None
    };

    let url = resolve_url(args.url, loaded.as_ref())?;
    if !validate_webhook_url(&url, "FEISHU_WEBHOOK_URL") {
        bail!("FEISHU_WEBHOOK_URL must be an http:// or https:// URL");
    }

    let policy = loaded
        .as_ref()
        .map(|l| l.config.retry_policy())
        .unwrap_or_else(RetryPolicy::network);

    let message = args.message.unwrap_or_else(|| {
        format!(
            "Courier webhook test at {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )
    });

    output::kv("Attempts", &policy.max_attempts().to_string());

    let notifier = WebhookNotifier::new(url)?;
    let spinner = output::spinner("Sending test message...");
    let result = notifier.send_with_retry(&message, &policy).await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            output::success("Test message delivered");
            Ok(())
        }
        Err(e) => {
            output::error(&format!("Delivery failed after {} attempt(s)", e.attempts()));
            output::kv("Error kind", &e.kind().to_string());
            Err(e.into())
        }
    }
}

/// Flag or environment first, then the config file
fn resolve_url(flag: Option<String>, loaded: Option<&LoadedConfig>) -> Result<String> {
    flag.filter(|u| !u.trim().is_empty())
        .or_else(|| {
            loaded
                .and_then(|l| l.config.feishu_webhook_url.clone())
                .filter(|u| !u.trim().is_empty())
        })
        .map(|u| u.trim().to_string())
        .ok_or_else(|| {
            anyhow!("No webhook URL: pass --url, set FEISHU_WEBHOOK_URL, or add it to the config file")
        })
}

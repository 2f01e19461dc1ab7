//! Individual validation rules
//!
//! Each rule reports exactly one violation: the first one it finds. Rules
//! never mutate the configuration and, apart from [`validate_config_file`],
//! never touch the filesystem.

use std::collections::HashMap;
use std::sync::LazyLock;

use camino::Utf8Path;
use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::{PipelineConfig, PlatformEntry, PushWindow, WeightConfig};

/// Allowed distance of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

static HH_MM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("time regex is valid"));

/// Fail with `ConfigNotFound` if the config file does not exist
pub fn validate_config_file(path: &Utf8Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::config_not_found(path.as_str()));
    }
    Ok(())
}

/// Fail with `MissingKeys` listing every required key absent from the source document
pub fn validate_required_keys(config: &PipelineConfig, required_keys: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required_keys
        .iter()
        .copied()
        .filter(|key| !config.has_key(key))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::missing_keys(missing))
    }
}

/// Check that a webhook URL is non-blank and uses http(s)
///
/// This is advisory: an invalid URL is logged and reported as `false`.
pub fn validate_webhook_url(url: &str, channel: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        warn!(channel = channel, url = url, "webhook URL must start with http:// or https://");
        return false;
    }

    true
}

/// Email settings are all-or-nothing, and addresses need an `@`
pub fn validate_email_config(config: &PipelineConfig) -> Result<()> {
    let fields = [
        ("EMAIL_FROM", trimmed(&config.email_from)),
        ("EMAIL_TO", trimmed(&config.email_to)),
        ("EMAIL_PASSWORD", trimmed(&config.email_password)),
    ];

    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.len() == fields.len() {
        return Ok(());
    }

    if !missing.is_empty() {
        return Err(Error::validation(
            "EMAIL",
            format!(
                "EMAIL_FROM, EMAIL_TO and EMAIL_PASSWORD must be set together; missing {}",
                missing.join(", ")
            ),
        ));
    }

    for (name, value) in &fields[..2] {
        if !value.contains('@') {
            return Err(Error::validation(
                *name,
                format!("expected an email address containing '@', found '{}'", value),
            ));
        }
    }

    Ok(())
}

/// Telegram bot token and chat id are both set or both unset
pub fn validate_telegram_config(config: &PipelineConfig) -> Result<()> {
    let has_token = !trimmed(&config.telegram_bot_token).is_empty();
    let has_chat = !trimmed(&config.telegram_chat_id).is_empty();

    match (has_token, has_chat) {
        (true, false) => Err(Error::validation(
            "TELEGRAM_CHAT_ID",
            "must be set when TELEGRAM_BOT_TOKEN is set",
        )),
        (false, true) => Err(Error::validation(
            "TELEGRAM_BOT_TOKEN",
            "must be set when TELEGRAM_CHAT_ID is set",
        )),
        _ => Ok(()),
    }
}

/// An enabled push window needs a zero-padded 24-hour `HH:MM` start and end
pub fn validate_push_window(window: &PushWindow) -> Result<()> {
    if !window.enabled {
        return Ok(());
    }

    let start = window.time_range.start.trim();
    let end = window.time_range.end.trim();

    if start.is_empty() || end.is_empty() {
        return Err(Error::validation(
            "PUSH_WINDOW.TIME_RANGE",
            format!(
                "START and END are required when the window is enabled, found START='{}' END='{}'",
                start, end
            ),
        ));
    }

    for (field, value) in [
        ("PUSH_WINDOW.TIME_RANGE.START", start),
        ("PUSH_WINDOW.TIME_RANGE.END", end),
    ] {
        if !is_hh_mm(value) {
            return Err(Error::validation(
                field,
                format!("expected HH:MM (24-hour, zero-padded), found '{}'", value),
            ));
        }
    }

    Ok(())
}

/// At least one platform; each with id and name; ids unique
pub fn validate_platforms(platforms: &[PlatformEntry]) -> Result<()> {
    if platforms.is_empty() {
        return Err(Error::validation(
            "PLATFORMS",
            "at least one platform must be configured",
        ));
    }

    // Uniqueness compares ids as written; trimming only decides presence
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (index, platform) in platforms.iter().enumerate() {
        let id = trimmed(&platform.id);
        if id.is_empty() {
            return Err(Error::validation(
                format!("PLATFORMS[{}]", index),
                "entry is missing 'id'",
            ));
        }
        if trimmed(&platform.name).is_empty() {
            return Err(Error::validation(
                format!("PLATFORMS[{}]", index),
                format!("entry '{}' is missing 'name'", id),
            ));
        }

        let raw_id = platform.id.as_deref().unwrap_or_default();
        if let Some(first) = seen.insert(raw_id, index) {
            return Err(Error::validation(
                format!("PLATFORMS[{}].id", index),
                format!("duplicate platform id '{}' (already used by PLATFORMS[{}])", raw_id, first),
            ));
        }
    }

    Ok(())
}

/// Each weight in `[0, 1]`, then the sum within `1.0 ± 0.01`
pub fn validate_weight_config(weights: &WeightConfig) -> Result<()> {
    for (name, weight) in weights.named() {
        if !(0.0..=1.0).contains(&weight) {
            return Err(Error::validation(
                format!("WEIGHT_CONFIG.{}", name),
                format!("expected a value between 0 and 1, found {}", weight),
            ));
        }
    }

    let total = weights.sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        let parts: Vec<String> = weights
            .named()
            .iter()
            .map(|(name, weight)| format!("{}={}", name, weight))
            .collect();
        return Err(Error::validation(
            "WEIGHT_CONFIG",
            format!(
                "weights must sum to 1.0 (±{}), found {:.2} ({})",
                WEIGHT_SUM_TOLERANCE,
                total,
                parts.join(", ")
            ),
        ));
    }

    Ok(())
}

/// Strict `HH:MM` check: zero-padded, 00:00 through 23:59
pub fn is_hh_mm(value: &str) -> bool {
    HH_MM_RE.is_match(value)
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

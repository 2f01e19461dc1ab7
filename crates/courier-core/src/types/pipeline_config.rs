//! Configuration types for the pipeline config file
//!
//! Field names follow the keys used by the pipeline (`REPORT_MODE`,
//! `PLATFORMS`, `PUSH_WINDOW`, ...). Unknown keys are accepted and ignored.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::RetryPolicy;
use crate::error::{Error, Result};

/// Root pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PipelineConfig {
    /// Report mode (e.g. "daily", "incremental", "current")
    #[serde(default)]
    pub report_mode: Option<String>,

    /// Platforms to collect from
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,

    /// Feishu bot webhook
    #[serde(default)]
    pub feishu_webhook_url: Option<String>,

    /// DingTalk bot webhook
    #[serde(default)]
    pub dingtalk_webhook_url: Option<String>,

    /// WeCom bot webhook
    #[serde(default)]
    pub wework_webhook_url: Option<String>,

    /// Sender address for email reports
    #[serde(default)]
    pub email_from: Option<String>,

    /// Recipient address for email reports
    #[serde(default)]
    pub email_to: Option<String>,

    /// SMTP password
    #[serde(default, deserialize_with = "scalar_string")]
    pub email_password: Option<String>,

    /// Telegram bot token
    #[serde(default, deserialize_with = "scalar_string")]
    pub telegram_bot_token: Option<String>,

    /// Telegram chat id
    #[serde(default, deserialize_with = "scalar_string")]
    pub telegram_chat_id: Option<String>,

    /// Time-of-day window in which pushes are allowed
    #[serde(default)]
    pub push_window: PushWindow,

    /// Ranking weights
    #[serde(default)]
    pub weight_config: WeightConfig,

    /// Retry policy for outbound notifications
    #[serde(default)]
    pub retry: Option<RetryPolicy>,

    /// Top-level keys present in the source document
    #[serde(skip)]
    pub source_keys: BTreeSet<String>,
}

impl PipelineConfig {
    /// Record which top-level keys the source document contained
    pub fn with_source_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the source document contained `key` at the top level
    pub fn has_key(&self, key: &str) -> bool {
        self.source_keys.contains(key)
    }

    /// Webhook channels as `(channel name, url)` pairs, skipping unset ones
    pub fn webhooks(&self) -> Vec<(&'static str, &str)> {
        [
            ("FEISHU_WEBHOOK_URL", &self.feishu_webhook_url),
            ("DINGTALK_WEBHOOK_URL", &self.dingtalk_webhook_url),
            ("WEWORK_WEBHOOK_URL", &self.wework_webhook_url),
        ]
        .into_iter()
        .filter_map(|(name, url)| url.as_deref().map(|u| (name, u)))
        .collect()
    }

    /// Retry policy for outbound delivery, falling back to the network preset
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_else(RetryPolicy::network)
    }
}

/// YAML scalar accepted where a string is expected
///
/// Chat ids and platform ids are often written unquoted (`-1001234567`).
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

/// Deserialize an optional string, keeping numbers and booleans as their text
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(s) => s,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

/// A single platform entry
///
/// Both fields are optional at parse time; a missing field is reported by
/// validation rather than by the YAML parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// Unique platform identifier
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    /// Display name
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: Option<String>,
}

impl PlatformEntry {
    /// Create an entry with both fields set
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }
}

/// Push window configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PushWindow {
    /// Whether pushes are restricted to the time range
    #[serde(default)]
    pub enabled: bool,

    /// Allowed time range
    #[serde(default)]
    pub time_range: TimeRange,
}

/// Start and end of a push window, both `HH:MM`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TimeRange {
    #[serde(default)]
    pub start: String,

    #[serde(default)]
    pub end: String,
}

impl PushWindow {
    /// An enabled window from `start` to `end`
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            enabled: true,
            time_range: TimeRange {
                start: start.into(),
                end: end.into(),
            },
        }
    }

    /// Whether a push at `time` is allowed
    ///
    /// A disabled window allows everything. Windows whose end is before their
    /// start wrap past midnight; `start == end` allows the whole day.
    pub fn contains(&self, time: NaiveTime) -> Result<bool> {
        if !self.enabled {
            return Ok(true);
        }

        let start = parse_hh_mm("PUSH_WINDOW.TIME_RANGE.START", &self.time_range.start)?;
        let end = parse_hh_mm("PUSH_WINDOW.TIME_RANGE.END", &self.time_range.end)?;

        Ok(if start == end {
            true
        } else if start < end {
            start <= time && time <= end
        } else {
            time >= start || time <= end
        })
    }
}

fn parse_hh_mm(field: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        Error::validation(field, format!("expected HH:MM (24-hour), found '{}'", value))
    })
}

/// Ranking weights; each in `[0, 1]`, summing to `1.0 ± 0.01`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WeightConfig {
    #[serde(default)]
    pub rank_weight: f64,

    #[serde(default)]
    pub frequency_weight: f64,

    #[serde(default)]
    pub hotness_weight: f64,
}

impl WeightConfig {
    /// Create a weight triple
    pub fn new(rank: f64, frequency: f64, hotness: f64) -> Self {
        Self {
            rank_weight: rank,
            frequency_weight: frequency,
            hotness_weight: hotness,
        }
    }

    /// Sum of the three weights
    pub fn sum(&self) -> f64 {
        self.rank_weight + self.frequency_weight + self.hotness_weight
    }

    /// Weights with their config key names
    pub fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("RANK_WEIGHT", self.rank_weight),
            ("FREQUENCY_WEIGHT", self.frequency_weight),
            ("HOTNESS_WEIGHT", self.hotness_weight),
        ]
    }
}

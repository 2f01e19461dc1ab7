//! Retry policy value object

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bounded exponential-backoff policy
///
/// A policy can only be obtained through [`RetryPolicy::new`], its presets or
/// deserialization, all of which enforce the invariants:
///
/// - `max_attempts >= 1`
/// - `initial_delay >= 1 ms`
/// - `backoff_multiplier >= 1.0` and finite
///
/// Serialized form uses kebab-case keys with the delay in milliseconds:
///
/// ```yaml
/// max-attempts: 3
/// initial-delay-ms: 1000
/// backoff-multiplier: 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRetryPolicy", into = "RawRetryPolicy")]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Create a policy, rejecting out-of-range parameters
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_multiplier: f64) -> Result<Self> {
        if max_attempts < 1 {
            return Err(Error::invalid_config(format!(
                "retry max-attempts must be at least 1, got {}",
                max_attempts
            )));
        }
        // Serialized in whole milliseconds, so anything shorter cannot round-trip
        if initial_delay < Duration::from_millis(1) {
            return Err(Error::invalid_config(format!(
                "retry initial delay must be at least 1 ms, got {:?}",
                initial_delay
            )));
        }
        if !backoff_multiplier.is_finite() || backoff_multiplier < 1.0 {
            return Err(Error::invalid_config(format!(
                "retry backoff-multiplier must be a finite number >= 1.0, got {}",
                backoff_multiplier
            )));
        }

        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_multiplier,
        })
    }

    /// Policy used for outbound network calls: 3 attempts, 1s, doubling
    pub fn network() -> Self {
        Self::default()
    }

    /// A policy that performs exactly one attempt
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Maximum number of attempts, including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the second attempt
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Factor applied to the delay after every wait
    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: Duration::from_millis(default_initial_delay()),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Wire form of [`RetryPolicy`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawRetryPolicy {
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    #[serde(default = "default_initial_delay")]
    initial_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    backoff_multiplier: f64,
}

impl TryFrom<RawRetryPolicy> for RetryPolicy {
    type Error = Error;

    fn try_from(raw: RawRetryPolicy) -> Result<Self> {
        RetryPolicy::new(
            raw.max_attempts,
            Duration::from_millis(raw.initial_delay_ms),
            raw.backoff_multiplier,
        )
    }
}

impl From<RetryPolicy> for RawRetryPolicy {
    fn from(policy: RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay() -> u64 {
    1000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.initial_delay(), Duration::from_secs(1));
        assert_eq!(policy.backoff_multiplier(), 2.0);
        assert_eq!(RetryPolicy::network(), policy);
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = RetryPolicy::new(0, Duration::from_secs(1), 2.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("max-attempts"));
    }

    #[test]
    fn test_rejects_zero_delay() {
        assert!(RetryPolicy::new(3, Duration::ZERO, 2.0).is_err());
    }

    #[test]
    fn test_rejects_sub_millisecond_delay() {
        let err = RetryPolicy::new(3, Duration::from_micros(500), 2.0).unwrap_err();
        assert!(err.to_string().contains("at least 1 ms"));
        assert!(RetryPolicy::new(3, Duration::from_millis(1), 2.0).is_ok());
    }

    #[test]
    fn test_serialized_policy_reads_back() {
        let policy = RetryPolicy::new(4, Duration::from_millis(1), 3.0).unwrap();
        let yaml = serde_yaml_ng::to_string(&policy).unwrap();
        assert!(yaml.contains("initial-delay-ms: 1"));

        let parsed: RetryPolicy = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, policy);
    }

    #[test]
    fn test_rejects_shrinking_or_nan_multiplier() {
        assert!(RetryPolicy::new(3, Duration::from_secs(1), 0.5).is_err());
        assert!(RetryPolicy::new(3, Duration::from_secs(1), f64::NAN).is_err());
        assert!(RetryPolicy::new(3, Duration::from_secs(1), f64::INFINITY).is_err());
        assert!(RetryPolicy::new(3, Duration::from_secs(1), 1.0).is_ok());
    }

    #[test]
    fn test_deserialize_kebab_case() {
        let yaml = "max-attempts: 5\ninitial-delay-ms: 250\nbackoff-multiplier: 1.5\n";
        let policy: RetryPolicy = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.initial_delay(), Duration::from_millis(250));
        assert_eq!(policy.backoff_multiplier(), 1.5);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let policy: RetryPolicy = serde_yaml_ng::from_str("max-attempts: 4\n").unwrap();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.initial_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_deserialize_rejects_invalid_values() {
        let result: std::result::Result<RetryPolicy, _> =
            serde_yaml_ng::from_str("max-attempts: 0\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("max-attempts must be at least 1"), "got: {}", err);
    }

    #[test]
    fn test_single_attempt_preset() {
        assert_eq!(RetryPolicy::single_attempt().max_attempts(), 1);
    }
}

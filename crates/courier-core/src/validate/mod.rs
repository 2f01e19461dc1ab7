//! Semantic validation of pipeline configuration
//!
//! [`ConfigValidator`] runs an ordered list of [`ValidationRule`]s against a
//! parsed [`PipelineConfig`]. The default mode stops at the first violation;
//! [`ValidationMode::CollectAll`] runs every rule and returns one summary
//! error.
//!
//! Webhook URL checks are advisory and live outside the rule list, see
//! [`ConfigValidator::invalid_webhooks`].

mod rules;

pub use rules::{
    is_hh_mm, validate_config_file, validate_email_config, validate_platforms,
    validate_push_window, validate_required_keys, validate_telegram_config,
    validate_webhook_url, validate_weight_config, WEIGHT_SUM_TOLERANCE,
};

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::PipelineConfig;

/// A named check over a whole configuration
#[derive(Clone, Copy)]
pub struct ValidationRule {
    pub name: &'static str,
    pub check: fn(&PipelineConfig) -> Result<()>,
}

impl ValidationRule {
    pub const fn new(name: &'static str, check: fn(&PipelineConfig) -> Result<()>) -> Self {
        Self { name, check }
    }
}

impl std::fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .finish()
    }
}

/// How many violations a validation pass reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Stop at the first violation
    #[default]
    FailFast,
    /// Run every rule and report all violations
    CollectAll,
}

/// Violations found by one validation pass, in rule order
#[derive(Debug, Default)]
pub struct ValidationReport {
    errors: Vec<Error>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Collapse the report into a result
    ///
    /// A single violation is returned as-is; several are folded into
    /// `Error::ValidationFailed`.
    pub fn into_result(mut self) -> Result<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(Error::validation_failed(&self.errors)),
        }
    }
}

/// Ordered set of semantic checks over a [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    rules: Vec<ValidationRule>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Validator with the standard rules: email, telegram, push window,
    /// platforms, then weights
    pub fn new() -> Self {
        Self {
            rules: vec![
                ValidationRule::new("email", validate_email_config),
                ValidationRule::new("telegram", validate_telegram_config),
                ValidationRule::new("push-window", |c| validate_push_window(&c.push_window)),
                ValidationRule::new("platforms", |c| validate_platforms(&c.platforms)),
                ValidationRule::new("weights", |c| validate_weight_config(&c.weight_config)),
            ],
        }
    }

    /// Validator with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Run every rule in order, stopping at the first violation
    pub fn validate(&self, config: &PipelineConfig) -> Result<()> {
        self.run(config, ValidationMode::FailFast).into_result()
    }

    /// Run every rule and report all violations
    pub fn validate_all(&self, config: &PipelineConfig) -> ValidationReport {
        self.run(config, ValidationMode::CollectAll)
    }

    pub fn run(&self, config: &PipelineConfig, mode: ValidationMode) -> ValidationReport {
        let mut report = ValidationReport::default();

        for rule in &self.rules {
            match (rule.check)(config) {
                Ok(()) => debug!("✓ {} passed", rule.name),
                Err(e) => {
                    debug!("✗ {} failed: {}", rule.name, e);
                    report.errors.push(e);
                    if mode == ValidationMode::FailFast {
                        break;
                    }
                }
            }
        }

        report
    }

    /// Configured webhook channels whose URL is not a usable http(s) URL
    ///
    /// Never fails validation; callers decide whether to warn or skip.
    pub fn invalid_webhooks<'a>(&self, config: &'a PipelineConfig) -> Vec<(&'static str, &'a str)> {
        config
            .webhooks()
            .into_iter()
            .filter(|(channel, url)| !url.trim().is_empty() && !validate_webhook_url(url, channel))
            .collect()
    }
}

//! Validate command

use anyhow::{bail, Result};
use camino::Utf8Path;
use chrono::NaiveTime;
use courier_core::types::PushWindow;
use courier_core::validate::{validate_config_file, validate_required_keys};
use courier_core::{ConfigValidator, LoadedConfig, ValidationMode};

use crate::cli::ValidateArgs;
use crate::output;

pub fn run(args: ValidateArgs, config_path: &Utf8Path) -> Result<()> {
    let spinner = output::spinner("Validating configuration...");

    let required: Vec<&str> = args.require.iter().map(String::as_str).collect();
    let mode = if args.all {
        ValidationMode::CollectAll
    } else {
        ValidationMode::FailFast
    };

    let loaded = validate_config_file(config_path)
        .and_then(|_| LoadedConfig::load(config_path))
        .and_then(|loaded| {
            validate_required_keys(&loaded.config, &required)?;
            Ok(loaded)
        });

    let loaded = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    let validator = ConfigValidator::new();
    let report = validator.run(&loaded.config, mode);
    spinner.finish_and_clear();

    if !report.is_ok() {
        for e in report.errors() {
            output::error(&e.to_string());
        }
        bail!(
            "{} validation error(s) in {}",
            report.errors().len(),
            loaded.config_path
        );
    }

    let config = &loaded.config;
    output::success(&format!("Configuration is valid: {}", loaded.config_path));
    if let Some(mode) = &config.report_mode {
        output::kv("Report mode", mode);
    }
    output::kv("Platforms", &config.platforms.len().to_string());
    output::kv(
        "Push window",
        &push_window_status(&config.push_window, chrono::Local::now().time()),
    );

    let policy = config.retry_policy();
    output::kv(
        "Retry",
        &format!(
            "{} attempts, {} ms initial delay, x{}",
            policy.max_attempts(),
            policy.initial_delay().as_millis(),
            policy.backoff_multiplier()
        ),
    );

    let webhooks = config.webhooks();
    if webhooks.is_empty() {
        output::info("No webhook channels configured");
    }
    for (channel, url) in validator.invalid_webhooks(config) {
        output::warning(&format!(
            "{} is not an http(s) URL and will be skipped: {}",
            channel, url
        ));
    }

    Ok(())
}

/// Human-readable push window state at `now`
fn push_window_status(window: &PushWindow, now: NaiveTime) -> String {
    if !window.enabled {
        return "disabled (pushes always allowed)".to_string();
    }

    let range = format!("{}-{}", window.time_range.start, window.time_range.end);
    match window.contains(now) {
        Ok(true) => format!("{} (open now)", range),
        Ok(false) => format!("{} (closed now)", range),
        Err(e) => format!("{} ({})", range, e),
    }
}

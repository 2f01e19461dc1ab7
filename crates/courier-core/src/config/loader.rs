//! Configuration file loading and parsing

use crate::error::{Error, Result};
use crate::types::PipelineConfig;
use crate::validate::{validate_config_file, validate_required_keys, ConfigValidator, ValidationMode};
use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml_ng::Value;
use std::fs;
use tracing::debug;

/// Default location of the pipeline configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

impl PipelineConfig {
    /// Parse a configuration document
    ///
    /// The document must be a non-empty mapping. Its top-level keys are kept
    /// so required-key checks can tell "absent" from "present but empty".
    pub fn from_yaml(content: &str) -> Result<Self> {
        let value: Value = serde_yaml_ng::from_str(content)?;

        let mapping = match &value {
            Value::Mapping(m) if !m.is_empty() => m,
            Value::Mapping(_) | Value::Null => {
                return Err(Error::invalid_config("configuration file is empty"))
            }
            _ => {
                return Err(Error::invalid_config(
                    "configuration root must be a mapping of keys to values",
                ))
            }
        };

        let keys: Vec<String> = mapping
            .keys()
            .filter_map(|k| k.as_str().map(str::to_owned))
            .collect();

        let config: PipelineConfig = serde_yaml_ng::from_value(value)?;
        Ok(config.with_source_keys(keys))
    }
}

/// Loaded pipeline configuration
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: PipelineConfig,

    /// Path to the configuration file
    pub config_path: Utf8PathBuf,
}

impl LoadedConfig {
    /// Load configuration from `path`
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let config = PipelineConfig::from_yaml(&content)?;
        debug!("Loaded configuration from {}", path);

        Ok(Self {
            config,
            config_path: path.to_owned(),
        })
    }

    /// Load configuration, then check required keys and run the validator
    pub fn load_and_validate(
        path: &Utf8Path,
        required_keys: &[&str],
        validator: &ConfigValidator,
        mode: ValidationMode,
    ) -> Result<Self> {
        validate_config_file(path)?;

        let loaded = Self::load(path)?;
        validate_required_keys(&loaded.config, required_keys)?;
        validator.run(&loaded.config, mode).into_result()?;

        Ok(loaded)
    }
}

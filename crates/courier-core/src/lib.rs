//! # courier-core
//!
//! Core library for the Courier notification pipeline providing:
//! - Error taxonomy shared by every courier crate
//! - Retry execution engine with policy-based configuration
//! - Pipeline configuration types and loading (config/config.yaml)
//! - Semantic configuration validation

pub mod config;
pub mod error;
pub mod retry;
pub mod types;
pub mod validate;

pub use config::{LoadedConfig, DEFAULT_CONFIG_PATH};
pub use error::{Error, ErrorKind, Result};
pub use types::{PipelineConfig, RetryPolicy};
pub use validate::{ConfigValidator, ValidationMode, ValidationReport};

//! Error types for courier-core
//!
//! Every variant belongs to exactly one [`ErrorKind`]. Callers branch on the
//! kind to decide whether a failure is a configuration defect (fail fast), a
//! transient transport problem (retry) or a delivery/processing fault.

use std::fmt;

use thiserror::Error;

/// Result type alias using courier-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by transport and delivery errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure classification shared by every courier crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Structural configuration problems (missing file, missing key, bad YAML)
    Config,
    /// Semantic or cross-field configuration problems
    Validation,
    /// Transport-level failures, retryable by default
    Network,
    /// Delivery-logic failures such as a missing target URL
    Notification,
    /// Malformed payloads encountered while processing
    DataProcessing,
    /// Anything that does not fit the categories above
    Other,
}

impl ErrorKind {
    /// Whether failures of this kind are retried by default
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Network)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "config",
            ErrorKind::Validation => "validation",
            ErrorKind::Network => "network",
            ErrorKind::Notification => "notification",
            ErrorKind::DataProcessing => "data-processing",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Core error types for Courier
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Required top-level keys are absent
    #[error("Missing required configuration keys: {}", keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A single semantic violation
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Several violations collected in one pass
    #[error("Configuration validation failed with {count} error(s):\n{errors}")]
    ValidationFailed { count: usize, errors: String },

    /// Transport-level failure
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Delivery-logic failure
    #[error("Notification error: {message}")]
    Notification {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Malformed payload
    #[error("Data processing error: {message}")]
    DataProcessing {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Uncategorised failure
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// The kind this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigNotFound { .. }
            | Error::MissingKeys { .. }
            | Error::InvalidConfig { .. }
            | Error::YamlParse(_)
            | Error::Io(_) => ErrorKind::Config,
            Error::Validation { .. } | Error::ValidationFailed { .. } => ErrorKind::Validation,
            Error::Network { .. } => ErrorKind::Network,
            Error::Notification { .. } => ErrorKind::Notification,
            Error::DataProcessing { .. } => ErrorKind::DataProcessing,
            Error::Other { .. } => ErrorKind::Other,
        }
    }

    /// Whether the default retry predicate would retry this error
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create a missing keys error
    pub fn missing_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingKeys {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a validation error for one field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a summary error from a list of violations
    pub fn validation_failed(errors: &[Error]) -> Self {
        Self::ValidationFailed {
            count: errors.len(),
            errors: errors
                .iter()
                .map(|e| format!("  - {}", e))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with its underlying cause
    pub fn network_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a notification error
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
            source: None,
        }
    }

    /// Create a notification error with its underlying cause
    pub fn notification_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Notification {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a data processing error
    pub fn data_processing(message: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: message.into(),
            source: None,
        }
    }

    /// Create a data processing error with its underlying cause
    pub fn data_processing_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::DataProcessing {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an uncategorised error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

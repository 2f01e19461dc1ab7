//! Type definitions for Courier configuration

mod pipeline_config;
mod retry_policy;

pub use pipeline_config::*;
pub use retry_policy::RetryPolicy;

//! Configuration loading

mod loader;

pub use loader::{LoadedConfig, DEFAULT_CONFIG_PATH};

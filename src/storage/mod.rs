//! Persistent settings.

pub mod config;

pub use config::{ensure_config, load_config, AppConfig, ConfigError};

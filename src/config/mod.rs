//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and typed accessors
//! - [`store`]: Shared, persisted configuration ([`ConfigStore`])
//! - [`validation`]: Required-key checks
//! - [`defaults`]: serde default functions

mod defaults;
mod store;
mod types;
mod validation;

pub use defaults::default_config_path;
pub use store::ConfigStore;
pub use types::{AdminConfig, Config, ConfigError, PluginSelection};
pub use validation::{ValidationError, validate};

//! Application configuration module.
//!
//! Manages the TOML config file: backend location and display
//! preferences.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, BASE_URL_ENV, ConfigKey, resolve_base_url};
pub use paths::ProfilePaths;

//! `AppConfig` struct and TOML read/write.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use cinerec_api::client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::render::RendererKind;

/// Environment variable overriding the configured backend URL.
pub const BASE_URL_ENV: &str = "CINEREC_BASE_URL";

/// Settings writable through `cinerec config set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigKey {
    /// `[backend] base_url`.
    BaseUrl,
    /// `[display] renderer`.
    Renderer,
    /// `[display] region`.
    Region,
}

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend location.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Listing presentation.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Backend configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BackendConfig {
    /// API base URL (default: `http://localhost:5000/api/`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Display configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Listing renderer.
    #[serde(default)]
    pub renderer: RendererKind,
    /// Watch-provider region (ISO 3166-1).
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    String::from("US")
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            region: default_region(),
        }
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Validates `value` and stores it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not valid for the key; the config
    /// is left unchanged.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            ConfigKey::BaseUrl => {
                Url::parse(value).with_context(|| format!("invalid backend URL: {value}"))?;
                self.backend.base_url = Some(String::from(value));
            }
            ConfigKey::Renderer => {
                self.display.renderer = <RendererKind as clap::ValueEnum>::from_str(value, true)
                    .map_err(|_| anyhow!("unknown renderer: {value} (grid, carousel)"))?;
            }
            ConfigKey::Region => {
                if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    bail!("region must be a two-letter country code, got `{value}`");
                }
                self.display.region = value.to_ascii_uppercase();
            }
        }
        Ok(())
    }

    /// Serializes the config as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config to TOML")
    }
}

/// Picks the backend URL: `--base-url`, then `CINEREC_BASE_URL`, then the
/// config file, then the built-in default.
///
/// # Errors
///
/// Returns an error if the chosen value is not a valid URL.
pub fn resolve_base_url(
    flag: Option<&str>,
    env: Option<&str>,
    config: &AppConfig,
) -> Result<Url> {
    let raw = flag
        .or(env)
        .or(config.backend.base_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL);
    Url::parse(raw).with_context(|| format!("invalid backend URL: {raw}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert!(config.backend.base_url.is_none());
        assert_eq!(config.display.renderer, RendererKind::Grid);
        assert_eq!(config.display.region, "US");
    }

    #[test]
    fn test_parse_full_config() {
        // Arrange
        let toml_str = r#"
[backend]
base_url = "https://cinerec.example.com/api/"

[display]
renderer = "carousel"
region = "JP"
"#;

        // Act
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        // Assert
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("https://cinerec.example.com/api/")
        );
        assert_eq!(config.display.renderer, RendererKind::Carousel);
        assert_eq!(config.display.region, "JP");
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            backend: BackendConfig {
                base_url: Some(String::from("http://127.0.0.1:9000/api/")),
            },
            display: DisplayConfig {
                renderer: RendererKind::Carousel,
                region: String::from("GB"),
            },
        };

        // Act
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_set_values() {
        // Arrange
        let mut config = AppConfig::default();

        // Act
        config.set(ConfigKey::BaseUrl, "http://10.0.0.5:5000/api/").unwrap();
        config.set(ConfigKey::Renderer, "Carousel").unwrap();
        config.set(ConfigKey::Region, " jp ").unwrap();

        // Assert
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("http://10.0.0.5:5000/api/")
        );
        assert_eq!(config.display.renderer, RendererKind::Carousel);
        assert_eq!(config.display.region, "JP");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        // Arrange
        let mut config = AppConfig::default();

        // Act & Assert
        assert!(config.set(ConfigKey::BaseUrl, "not a url").is_err());
        assert!(config.set(ConfigKey::Renderer, "poster-wall").is_err());
        assert!(config.set(ConfigKey::Region, "USA").is_err());
        assert!(config.set(ConfigKey::Region, "1A").is_err());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nrenderer = \"carousel\"\n").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.display.renderer, RendererKind::Carousel);
        assert_eq!(config.display.region, "US");
    }

    #[test]
    fn test_load_invalid_renderer_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nrenderer = \"poster-wall\"\n").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_base_url_precedence() {
        // Arrange
        let config = AppConfig {
            backend: BackendConfig {
                base_url: Some(String::from("http://config.test/api/")),
            },
            ..AppConfig::default()
        };

        // Act & Assert
        assert_eq!(
            resolve_base_url(Some("http://flag.test/api/"), Some("http://env.test/api/"), &config)
                .unwrap()
                .as_str(),
            "http://flag.test/api/"
        );
        assert_eq!(
            resolve_base_url(None, Some("http://env.test/api/"), &config)
                .unwrap()
                .host_str(),
            Some("env.test")
        );
        assert_eq!(
            resolve_base_url(None, None, &config).unwrap().host_str(),
            Some("config.test")
        );
        assert_eq!(
            resolve_base_url(None, None, &AppConfig::default())
                .unwrap()
                .as_str(),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_resolve_base_url_rejects_garbage() {
        // Arrange & Act
        let result = resolve_base_url(Some("not a url"), None, &AppConfig::default());

        // Assert
        assert!(result.unwrap_err().to_string().contains("invalid backend URL"));
    }
}

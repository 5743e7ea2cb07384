//! Configuration management for the anime catalogue.
//!
//! Settings are read from a TOML file with `[api]`, `[catalogue]` and
//! `[logging]` tables. Every setting has a default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Jikan API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Listing, search and scrolling behaviour
    #[serde(default)]
    pub catalogue: CatalogueConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Jikan API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Catalogue behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// Items requested per listing page
    pub page_limit: u32,

    /// Quiet period before a typed search is committed, in milliseconds
    pub debounce_ms: u64,

    /// Rows before the end of the list at which the next page is requested
    pub scroll_offset_rows: usize,

    /// Rows visible at once in the interactive browser
    pub viewport_rows: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            page_limit: 16,
            debounce_ms: 250,
            scroll_offset_rows: 4,
            viewport_rows: 8,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            timeout_secs: 30,
            user_agent: concat!("anime-catalogue/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            default_level: "info".to_string(),
            // stdout belongs to the browser
            console: false,
            file: true,
            json_format: false,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CatalogueConfig {
    /// Debounce delay as a `Duration`
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            base_url = %config.api.base_url,
            page_limit = config.catalogue.page_limit,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Write this configuration as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration written");
        Ok(())
    }

    /// Parse the configured default log level, falling back to INFO
    pub fn log_level(&self) -> tracing::Level {
        self.logging
            .default_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.catalogue.page_limit, 16);
        assert_eq!(config.catalogue.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = Config::default();
        original_config.catalogue.debounce_ms = 400;
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.api.base_url, original_config.api.base_url);
        assert_eq!(loaded_config.catalogue.debounce_ms, 400);

        Ok(())
    }

    #[test]
    fn test_missing_catalogue_section_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[api]
base_url = "http://localhost:8080/v4"
timeout_secs = 5
user_agent = "test"

[logging]
log_dir = "logs"
default_level = "debug"
console = true
file = false
json_format = false
"#,
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.catalogue.scroll_offset_rows, 4);
        assert_eq!(config.log_level(), tracing::Level::DEBUG);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.catalogue.viewport_rows, 8);
    }

    #[test]
    fn test_invalid_log_level_falls_back_to_info() {
        let mut config = Config::default();
        config.logging.default_level = "chatty".to_string();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_partial_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[catalogue]\npage_limit = 25\ndebounce_ms = 100\nscroll_offset_rows = 2\nviewport_rows = 10\n")?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.catalogue.page_limit, 25);
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.logging.file);

        Ok(())
    }

    #[test]
    fn test_malformed_file_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[api\nbase_url = ")?;

        assert!(Config::from_file(&config_path).is_err());
        Ok(())
    }

    #[test]
    fn test_partial_tables_fill_in_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[api]\nbase_url = \"http://x/v4\"\n\n[catalogue]\ndebounce_ms = 100\n\n[logging]\nconsole = true\n",
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.api.base_url, "http://x/v4");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.catalogue.debounce_ms, 100);
        assert_eq!(config.catalogue.page_limit, 16);
        assert!(config.logging.console);
        assert_eq!(config.logging.log_dir, "data/logs");

        Ok(())
    }
}

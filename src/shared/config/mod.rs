//! Application configuration module
//!
//! `AppConfig` holds the few settings the client accepts from outside: the
//! API base URL, the probe endpoint and where the session file lives. It can
//! be assembled with [`AppConfigBuilder`] or read from a TOML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Collection endpoint probed for availability
pub const DEFAULT_PROBE_PATH: &str = "/api/Results";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server URL
    pub server_url: Option<String>,
    /// Endpoint used by the availability probe
    pub probe_path: Option<String>,
    /// File backing the persisted session
    pub session_file: Option<PathBuf>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if let Some(path) = &self.probe_path {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
        }
        Ok(())
    }

    pub fn probe_path(&self) -> &str {
        self.probe_path.as_deref().unwrap_or(DEFAULT_PROBE_PATH)
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    probe_path: Option<String>,
    session_file: Option<PathBuf>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the availability probe endpoint
    pub fn probe_path(mut self, path: impl Into<String>) -> Self {
        self.probe_path = Some(path.into());
        self
    }

    /// Set the session file location
    pub fn session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            server_url: self.server_url.map(|url| url.trim_end_matches('/').to_string()),
            probe_path: self.probe_path,
            session_file: self.session_file,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid endpoint path: {0}")]
    InvalidPath(String),
    #[error("failed to read config: {0}")]
    Io(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = AppConfig::builder()
            .server_url("https://api.example.com/")
            .build()
            .unwrap();
        assert_eq!(config.server_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.probe_path(), DEFAULT_PROBE_PATH);
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let err = AppConfig::builder().server_url("localhost:7252").build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidUrl("localhost:7252".to_string()));
    }

    #[test]
    fn test_from_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            server_url = "http://127.0.0.1:5000"
            probe_path = "/api/Courses"
            session_file = "/tmp/edusync.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server_url.as_deref(), Some("http://127.0.0.1:5000"));
        assert_eq!(config.probe_path(), "/api/Courses");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/edusync.json")));
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = AppConfig::from_toml_str("retries = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_probe_path_must_be_absolute() {
        let err = AppConfig::builder().probe_path("api/Results").build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidPath("api/Results".to_string()));
    }
}

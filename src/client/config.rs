use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};
use std::path::PathBuf;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "https://localhost:7252";

/// Environment variable overriding the server URL
pub const API_URL_ENV: &str = "EDUSYNC_API_URL";

/// Client configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        let server_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let app = AppConfig {
            server_url: Some(server_url.trim_end_matches('/').to_string()),
            ..AppConfig::default()
        };
        Self { app }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::from_app(builder.build()?))
    }

    /// Wrap an already validated `AppConfig`
    pub fn from_app(app: AppConfig) -> Self {
        Self { app }
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn probe_path(&self) -> &str {
        self.app.probe_path()
    }

    /// Session file location, defaulting to the user's data directory
    pub fn session_file(&self) -> Option<PathBuf> {
        self.app
            .session_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("edusync").join("session.json")))
    }
}

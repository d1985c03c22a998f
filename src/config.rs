use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Overrides `[api].base_url` when set to a non-blank value.
pub const API_URL_ENV: &str = "PARKING_API_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub api: Option<ApiSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSection {
    /// Backend root, e.g. `http://127.0.0.1:8000`
    pub base_url: Option<String>,
    /// Per-request timeout in seconds (default: 10)
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

impl Config {
    /// Backend root: environment override, then `[api].base_url`, then the
    /// local default.
    pub fn api_base_url(&self) -> String {
        let from_env = std::env::var(API_URL_ENV).ok();
        self.resolve_base_url(from_env.as_deref())
    }

    fn resolve_base_url(&self, env_override: Option<&str>) -> String {
        let configured = self.api.as_ref().and_then(|api| api.base_url.as_deref());
        [env_override, configured]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }

    /// Returns the request timeout as Duration (default: 10 seconds)
    pub fn api_timeout(&self) -> Duration {
        let secs = self
            .api
            .as_ref()
            .and_then(|api| api.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Parsed `[logging].level`, falling back to `info` for unknown names.
    pub fn log_level(&self) -> tracing::Level {
        self.logging
            .level
            .trim()
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

//! Configuration file support for rehearse.
//!
//! Loads configuration from `rehearse.toml` in the working directory. Every
//! section and key is optional; CLI flags override file values, which
//! override the defaults below.

use anyhow::{Context, Result};
use rehearse_core::ReplyDelay;
use rehearse_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "rehearse.toml";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
/// Pause applied by `/api/chat` before answering
pub const DEFAULT_API_DELAY_MS: u64 = 1000;
pub const DEFAULT_MIN_DELAY_MS: u64 = 1500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 3000;
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    /// Key the conversation log is persisted under
    pub storage_key: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub login_url: Option<String>,
}

impl Config {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn host(&self) -> &str {
        self.server.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn api_delay(&self) -> Duration {
        Duration::from_millis(self.server.api_delay_ms.unwrap_or(DEFAULT_API_DELAY_MS))
    }

    pub fn reply_delay(&self) -> ReplyDelay {
        ReplyDelay::from_millis(
            self.session.min_delay_ms.unwrap_or(DEFAULT_MIN_DELAY_MS),
            self.session.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
        )
    }

    pub fn storage_key(&self) -> &str {
        self.session
            .storage_key
            .as_deref()
            .unwrap_or(rehearse_db::DEFAULT_STORAGE_KEY)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.level.as_deref()
    }

    /// Configured log format; unknown names are a hard error.
    pub fn log_format(&self) -> Result<Option<LogFormat>> {
        self.logging
            .format
            .as_deref()
            .map(|f| f.parse::<LogFormat>().map_err(anyhow::Error::msg))
            .transpose()
    }

    pub fn log_dir(&self) -> Option<&Path> {
        self.logging.log_dir.as_deref()
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn login_url(&self) -> &str {
        self.client
            .login_url
            .as_deref()
            .unwrap_or(rehearse_client::DEFAULT_LOGIN_URL)
    }
}

//! Configuration management for tmscout.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables. CLI flags are applied last by the commands that
//! take them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ocr::AzureCredentials;
use crate::search::SearchConfig;

/// Config file picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "tmscout.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TMSCOUT_CONFIG";

/// Errors while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Azure Read API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub azure_key: Option<String>,
    pub azure_endpoint: Option<String>,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            azure_key: None,
            azure_endpoint: None,
            poll_interval_ms: 1000,
            timeout_secs: 60,
        }
    }
}

/// Search limits, timeouts and outbound identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_results: usize,
    pub mapped_max_results: usize,
    pub probe_timeout_secs: u64,
    pub verify_timeout_secs: u64,
    pub page_timeout_secs: u64,
    /// None for the default browser agent, "impersonate", or a custom string.
    pub user_agent: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            mapped_max_results: 3,
            probe_timeout_secs: 10,
            verify_timeout_secs: 5,
            page_timeout_secs: 15,
            user_agent: None,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub ocr: OcrSettings,
    pub search: SearchSettings,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path`, `$TMSCOUT_CONFIG`, or `./tmscout.toml`, then
    /// apply environment overrides.
    ///
    /// An explicitly named file must exist; the working-directory default is
    /// optional.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().filter(|s| !s.is_empty()).map(PathBuf::from));

        let mut settings = match explicit {
            Some(path) => Self::load_from_path(&path).await?,
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if tokio::fs::try_exists(&local).await.unwrap_or(false) {
                    Self::load_from_path(&local).await?
                } else {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            }
        };

        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Parse a TOML settings file.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut settings = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.source_path = Some(path.to_path_buf());
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply `PORT`, `AZURE_VISION_KEY` and `AZURE_VISION_ENDPOINT` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(key) = lookup("AZURE_VISION_KEY") {
            self.ocr.azure_key = Some(key);
        }
        if let Some(endpoint) = lookup("AZURE_VISION_ENDPOINT") {
            self.ocr.azure_endpoint = Some(endpoint);
        }
        Ok(())
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            max_results: self.search.max_results.max(1),
            mapped_max_results: self.search.mapped_max_results.max(1),
            probe_timeout: Duration::from_secs(self.search.probe_timeout_secs),
            verify_timeout: Duration::from_secs(self.search.verify_timeout_secs),
            page_timeout: Duration::from_secs(self.search.page_timeout_secs),
        }
    }

    pub fn azure_credentials(&self) -> Option<AzureCredentials> {
        AzureCredentials::from_parts(self.ocr.azure_key.clone(), self.ocr.azure_endpoint.clone())
    }

    pub fn ocr_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ocr.poll_interval_ms)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr.timeout_secs)
    }
}

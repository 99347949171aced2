//! Client configuration
//!
//! Settings live in `~/.config/apiquery/config.toml`; environment variables
//! (optionally from a `.env` file) override the file.

pub mod session;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::api::auth::RefreshMode;
use crate::api::client::normalize_sub_path;
use crate::api::constants::{DEFAULT_API_PREFIX, DEFAULT_REFRESH_PATH};

pub use session::FileSession;

pub const ENV_BASE_URL: &str = "APIQUERY_BASE_URL";
pub const ENV_API_PREFIX: &str = "APIQUERY_API_PREFIX";
pub const ENV_REFRESH_PATH: &str = "APIQUERY_REFRESH_PATH";
pub const ENV_TIMEOUT_SECS: &str = "APIQUERY_TIMEOUT_SECS";
pub const ENV_REFRESH_MODE: &str = "APIQUERY_REFRESH_MODE";

/// Keys accepted by [`ClientConfig::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "base_url",
    "api_prefix",
    "refresh_path",
    "timeout_secs",
    "refresh_mode",
];

/// Where and how the client talks to the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme and host, e.g. `https://api.example.com`.
    pub base_url: String,
    pub api_prefix: String,
    pub refresh_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub refresh_mode: RefreshMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            timeout_secs: None,
            refresh_mode: RefreshMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// `base_url` joined with `api_prefix`; every sub-path is appended to it.
    pub fn base_path(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            normalize_sub_path(self.api_prefix.trim_end_matches('/'))
        )
    }

    /// Fail early when no remote end is configured.
    pub fn ensure_base_url(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!(
                "No base URL configured. Set {} or run `apiquery config set base_url <url>`",
                ENV_BASE_URL
            );
        }
        Ok(())
    }

    /// `~/.config/apiquery`
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("apiquery")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Effective configuration: the default file overridden by the
    /// environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env()?;
        Ok(config)
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup` (normally the process environment).
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (env, key) in [
            (ENV_BASE_URL, "base_url"),
            (ENV_API_PREFIX, "api_prefix"),
            (ENV_REFRESH_PATH, "refresh_path"),
            (ENV_TIMEOUT_SECS, "timeout_secs"),
            (ENV_REFRESH_MODE, "refresh_mode"),
        ] {
            if let Some(value) = lookup(env) {
                debug!("Config override from {}", env);
                self.set(key, &value)
                    .with_context(|| format!("Invalid value in {}", env))?;
            }
        }
        Ok(())
    }

    /// Set one field by name, parsing `value` as that field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "base_url" => self.base_url = value.to_string(),
            "api_prefix" => self.api_prefix = value.to_string(),
            "refresh_path" => self.refresh_path = value.to_string(),
            "timeout_secs" => {
                self.timeout_secs = if value.is_empty() {
                    None
                } else {
                    Some(
                        value
                            .parse()
                            .with_context(|| format!("'{}' is not a number of seconds", value))?,
                    )
                }
            }
            "refresh_mode" => {
                self.refresh_mode = value.parse().map_err(anyhow::Error::msg)?;
            }
            other => bail!(
                "Unknown config key '{}'. Valid keys: {}",
                other,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

/// Builder for [`ClientConfig`] with the same defaults as the file.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        self.config.api_prefix = api_prefix.into();
        self
    }

    pub fn refresh_path(mut self, refresh_path: impl Into<String>) -> Self {
        self.config.refresh_path = refresh_path.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.config.refresh_mode = mode;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

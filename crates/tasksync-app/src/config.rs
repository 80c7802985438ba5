//! Client configuration loaded from TOML with environment and flag overrides.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use url::Url;

/// Environment variable overriding the configured API base URL.
pub const API_URL_ENV: &str = "TASKSYNC_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the task API.
    pub api_url: String,
    /// Per-request transport timeout.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Default configuration file location (`$CONFIG_DIR/tasksync/config.toml`).
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tasksync").join("config.toml"))
}

impl ClientConfig {
    /// Resolve the effective configuration for a process.
    ///
    /// Reads `path` (or the default location), then applies
    /// [`API_URL_ENV`] and finally `api_url_override`.
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed, or when the resulting
    /// URL or timeout is invalid.
    pub fn resolve(path: Option<&Path>, api_url_override: Option<&str>) -> Result<Self> {
        Self::resolve_with(path, api_url_override, |key| std::env::var(key).ok())
    }

    /// Same as [`resolve`](Self::resolve) with an injectable environment.
    ///
    /// # Errors
    /// As for [`resolve`](Self::resolve).
    pub fn resolve_with<F>(
        path: Option<&Path>,
        api_url_override: Option<&str>,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if let Some(url) = env(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(url) = api_url_override {
            config.api_url = url.to_owned();
        }
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file; a missing file yields the defaults.
    ///
    /// # Errors
    /// Fails when the file exists but cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Transport timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_url)
            .with_context(|| format!("invalid api_url '{}'", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api_url '{}' must use http or https", self.api_url);
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xdg::BaseDirectories;

use crate::api::MAX_PAGE_LIMIT;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

pub const ENV_API_URL: &str = "CODDOC_API_URL";
pub const ENV_PROVIDER: &str = "CODDOC_LLM_PROVIDER";

/// Resolved client settings.
///
/// Built once at startup (defaults, then `config.toml`, then environment,
/// then CLI flags) and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL.
    pub api_url: String,
    /// Provider id sent as `llm_provider` unless the user picks another one.
    pub default_provider: String,
    /// Reviews per history page.
    pub page_limit: u32,
    /// syntect theme for code blocks.
    pub theme: String,
    /// Editor for the code buffer; falls back to $VISUAL, $EDITOR, vi.
    pub editor: Option<String>,
    /// Whole-request timeout. Unset means the transport default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            default_provider: DEFAULT_PROVIDER.to_owned(),
            page_limit: DEFAULT_PAGE_LIMIT,
            theme: DEFAULT_THEME.to_owned(),
            editor: None,
            request_timeout_secs: None,
        }
    }
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file; unlike the default location it must exist.
    pub config_file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub provider: Option<String>,
}

impl Config {
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match (&overrides.config_file, Self::config_path()) {
            (Some(explicit), _) => Self::from_file(explicit)?,
            (None, Some(path)) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        config.apply_overrides(overrides);
        Ok(config.normalized())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid config TOML")
    }

    /// `$XDG_CONFIG_HOME/coddoc/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        BaseDirectories::with_prefix("coddoc")
            .ok()
            .map(|dirs| dirs.get_config_home().join("config.toml"))
    }

    fn apply_env(&mut self) {
        if let Some(url) = non_empty_env(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(provider) = non_empty_env(ENV_PROVIDER) {
            self.default_provider = provider;
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = overrides.api_url.as_deref().filter(|s| !s.trim().is_empty()) {
            self.api_url = url.to_owned();
        }
        if let Some(provider) = overrides.provider.as_deref().filter(|s| !s.trim().is_empty()) {
            self.default_provider = provider.to_owned();
        }
    }

    fn normalized(mut self) -> Self {
        self.api_url = self.api_url.trim().trim_end_matches('/').to_owned();
        if self.api_url.is_empty() {
            self.api_url = DEFAULT_API_URL.to_owned();
        }
        self.page_limit = self.page_limit.clamp(1, MAX_PAGE_LIMIT);
        if self.theme.trim().is_empty() {
            self.theme = DEFAULT_THEME.to_owned();
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

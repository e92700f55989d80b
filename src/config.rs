//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.buildtriage.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// CI server settings.
    #[serde(default)]
    pub ci: CiConfig,

    /// Log extraction settings.
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Analysis service settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// CI server settings.
///
/// The API token is deliberately not part of the config file; it comes
/// only from `--api-token` or `CI_API_TOKEN`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CiConfig {
    /// CI server base URL.
    #[serde(default)]
    pub base_url: String,

    /// Basic-auth username.
    #[serde(default)]
    pub username: String,
}

/// Log extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Number of tail lines always included in the report.
    #[serde(default = "default_window_lines")]
    pub window_lines: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            window_lines: default_window_lines(),
        }
    }
}

fn default_window_lines() -> usize {
    crate::extract::DEFAULT_WINDOW
}

/// Analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Analysis endpoint URL.
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Request timeout in seconds (applies to both HTTP calls).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_llm_url() -> String {
    crate::analyze::DEFAULT_LLM_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".buildtriage.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref ci_url) = args.ci_url {
            self.ci.base_url = ci_url.clone();
        }
        if let Some(ref user) = args.user {
            self.ci.username = user.clone();
        }

        if let Some(window) = args.window {
            self.extract.window_lines = window;
        }

        if let Some(ref llm_url) = args.llm_url {
            self.llm.url = llm_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.llm.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

//! Configuration file handling for the gwctl CLI
//!
//! Manages loading and saving CLI configuration from ~/.gwctl/config.toml
//! and resolving client settings from multiple sources.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ClientSettings, LogFormat};

/// CLI configuration stored in ~/.gwctl/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Bearer token for the gateway admin API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Gateway admin API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Directory for the last-applied configuration cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Get the default configuration file path (~/.gwctl/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Unable to determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".gwctl");
        path.push("config.toml");

        Ok(path)
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load configuration from a specific path; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsFlags {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub cache_dir: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

/// Read a token file, rejecting an empty one
pub fn read_token_file(path: &Path) -> Result<String> {
    debug!("Reading token from file: {}", path.display());
    let token = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read token file: {}", path.display()))?
        .trim()
        .to_string();

    if token.is_empty() {
        anyhow::bail!("Token file is empty: {}", path.display());
    }

    Ok(token)
}

/// Resolve client settings from multiple sources
///
/// Each value is taken from the first source that provides it:
/// 1. command line flags (`--token` before `--token-file`)
/// 2. ~/.gwctl/config.toml
/// 3. `GWCTL_*` environment variables, passed in as `env`
/// 4. built-in defaults (already folded into `env`)
pub fn resolve_settings(
    flags: SettingsFlags,
    file: CliConfig,
    env: ClientSettings,
) -> Result<ClientSettings> {
    let token = match (flags.token, flags.token_file) {
        (Some(token), _) => {
            debug!("Using token from --token flag");
            Some(token)
        }
        (None, Some(path)) => Some(read_token_file(&path)?),
        (None, None) => file.token.filter(|t| !t.is_empty()).or(env.token),
    };

    let base_url = flags
        .base_url
        .or_else(|| file.base_url.filter(|u| !u.is_empty()))
        .unwrap_or(env.base_url);
    debug!(base_url = %base_url, "resolved gateway URL");

    let settings = ClientSettings {
        base_url,
        token,
        timeout_seconds: flags.timeout.or(file.timeout).unwrap_or(env.timeout_seconds),
        connect_timeout_seconds: env.connect_timeout_seconds,
        cache_dir: flags.cache_dir.or(file.cache_dir).or(env.cache_dir),
        log_format: flags.log_format.unwrap_or(env.log_format),
    };

    settings.validate().context("Invalid client settings")?;
    Ok(settings)
}

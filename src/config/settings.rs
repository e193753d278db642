//! # Configuration Settings
//!
//! Defines the client configuration for the gateway admin API.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::errors::{GwctlError, Result};

/// Default admin API address of a locally running gateway
pub const DEFAULT_BASE_URL: &str = "http://localhost:15000";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (expected text or json)", other)),
        }
    }
}

/// Gateway client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClientSettings {
    /// Admin API base URL
    #[validate(url(message = "Gateway URL must be a valid URL"))]
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Timeout must be between 1 and 300 seconds"
    ))]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Directory holding the last-applied configuration cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_seconds: 30,
            connect_timeout_seconds: 5,
            cache_dir: None,
            log_format: LogFormat::Text,
        }
    }
}

impl ClientSettings {
    /// Create settings from `GWCTL_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("GWCTL_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.base_url);

        let token = std::env::var("GWCTL_TOKEN").ok().filter(|s| !s.is_empty());

        let timeout_seconds = std::env::var("GWCTL_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        let connect_timeout_seconds = std::env::var("GWCTL_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.connect_timeout_seconds);

        let cache_dir = std::env::var("GWCTL_CACHE_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let log_format = std::env::var("GWCTL_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse::<LogFormat>().ok())
            .unwrap_or(defaults.log_format);

        Self {
            base_url,
            token,
            timeout_seconds,
            connect_timeout_seconds,
            cache_dir,
            log_format,
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(GwctlError::from)?;
        self.validate_custom()
    }

    /// Checks the validator attributes cannot express
    fn validate_custom(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            GwctlError::validation_field(format!("Invalid gateway URL: {}", e), "base_url")
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(GwctlError::validation_field(
                "Gateway URL must use http or https",
                "base_url",
            ));
        }

        if self.connect_timeout_seconds > self.timeout_seconds {
            return Err(GwctlError::validation(
                "Connect timeout cannot exceed the request timeout",
            ));
        }

        if matches!(&self.token, Some(token) if token.trim().is_empty()) {
            return Err(GwctlError::validation_field("Token cannot be blank", "token"));
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = ClientSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let settings = ClientSettings {
            base_url: "not a url".to_string(),
            ..ClientSettings::default()
        };
        assert!(matches!(settings.validate(), Err(GwctlError::Validation { .. })));

        let settings = ClientSettings {
            base_url: "ftp://gateway".to_string(),
            ..ClientSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_timeout_range() {
        let settings = ClientSettings {
            timeout_seconds: 0,
            ..ClientSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = ClientSettings {
            timeout_seconds: 2,
            connect_timeout_seconds: 5,
            ..ClientSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_blank_token_rejected() {
        let settings = ClientSettings {
            token: Some("  ".to_string()),
            ..ClientSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}

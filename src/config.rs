use std::env;
use thiserror::Error;

/// Base URL used when `ASSIST_API_URL` is not provided.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Extension accepted when `ASSIST_ACCEPTED_EXTENSIONS` is not provided.
pub const DEFAULT_ACCEPTED_EXTENSION: &str = "txt";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable {key}: {reason}")]
    InvalidValue {
        /// Variable that failed validation.
        key: String,
        /// Short explanation of the failure.
        reason: String,
    },
}

/// Runtime configuration for the assist client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the service hosting `/summarize/`, `/qa/`, and `/search/`.
    pub api_url: String,
    /// Lowercase file extensions accepted for selection. Empty accepts everything.
    pub accepted_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            accepted_extensions: vec![DEFAULT_ACCEPTED_EXTENSION.to_string()],
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = match optional("ASSIST_API_URL") {
            Some(url) => validate_api_url("ASSIST_API_URL", &url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let accepted_extensions = match optional("ASSIST_ACCEPTED_EXTENSIONS") {
            Some(raw) => parse_extensions("ASSIST_ACCEPTED_EXTENSIONS", &raw)?,
            None => vec![DEFAULT_ACCEPTED_EXTENSION.to_string()],
        };

        Ok(Self {
            api_url,
            accepted_extensions,
        })
    }

    /// Replace the API base URL, validating it the same way as the environment value.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = validate_api_url("--api-url", url)?;
        Ok(self)
    }
}

fn validate_api_url(key: &str, url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("expected an http(s) URL, got '{trimmed}'"),
        })
    }
}

fn parse_extensions(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    if raw.trim() == "*" {
        return Ok(Vec::new());
    }

    let extensions: Vec<String> = raw
        .split(',')
        .map(|value| value.trim().trim_start_matches('.').to_lowercase())
        .filter(|value| !value.is_empty())
        .collect();

    if extensions.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: "no extensions listed".into(),
        });
    }
    Ok(extensions)
}

/// Load `.env` (when present) and then the configuration from the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        api_url = %config.api_url,
        accepted_extensions = ?config.accepted_extensions,
        "Loaded configuration"
    );
    Ok(config)
}

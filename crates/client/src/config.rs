//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SILK_ROAD_API_URL` - Base URL of the marketplace API (e.g., `https://api.example.com/api`)
//!
//! ## Optional
//! - `SILK_ROAD_API_TOKEN` - Bearer token for authenticated requests
//! - `SILK_ROAD_API_TIMEOUT_SECS` - Request timeout in seconds (default: 30)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API, including any path prefix.
    pub base_url: Url,
    /// Bearer token attached to every request, if present.
    pub token: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Build a config with just a base URL (no token, default timeout).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SILK_ROAD_API_URL".into(), e.to_string()))?;
        Ok(Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("SILK_ROAD_API_URL")
            .map_err(|_| ConfigError::MissingEnvVar("SILK_ROAD_API_URL".into()))?;
        let mut config = Self::new(&base_url)?;

        if let Ok(token) = std::env::var("SILK_ROAD_API_TOKEN")
            && !token.is_empty()
        {
            config.token = Some(SecretString::from(token));
        }

        if let Ok(raw) = std::env::var("SILK_ROAD_API_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                ConfigError::InvalidEnvVar("SILK_ROAD_API_TIMEOUT_SECS".into(), raw)
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Replace the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parses_base_url() {
        let config = ApiConfig::new("http://localhost:8080/api").unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_new_rejects_garbage_url() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_with_token() {
        let config = ApiConfig::new("http://localhost:8080/api")
            .unwrap()
            .with_token(SecretString::from("tok"));
        assert!(config.token.is_some());
    }
}

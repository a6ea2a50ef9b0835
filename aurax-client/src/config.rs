//! Client configuration
//!
//! Connection settings and credentials for the Aurax API, plus the
//! reconnect policy used by task streams.

use reqwest::header::HeaderValue;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://backend.aurax.co.in";

/// Client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "https://backend.aurax.co.in")
    pub base_url: String,

    /// Value of the `x-api-key` header
    pub api_key: String,

    /// Value of the `x-key-id` header
    pub key_id: String,

    /// Timeout applied to every request except task streams
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration for the default endpoint
    pub fn new(api_key: impl Into<String>, key_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            key_id: key_id.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - AURAX_API_KEY (required)
    /// - AURAX_KEY_ID (required)
    /// - AURAX_BASE_URL (optional, default: https://backend.aurax.co.in)
    /// - AURAX_REQUEST_TIMEOUT (optional, seconds, default: 30)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("AURAX_API_KEY")
            .map_err(|_| ClientError::Config("AURAX_API_KEY environment variable not set".into()))?;

        let key_id = std::env::var("AURAX_KEY_ID")
            .map_err(|_| ClientError::Config("AURAX_KEY_ID environment variable not set".into()))?;

        let mut config = Self::new(api_key, key_id);

        if let Ok(base_url) = std::env::var("AURAX_BASE_URL") {
            config.base_url = base_url;
        }

        if let Some(timeout) = std::env::var("AURAX_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(timeout);
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() || self.key_id.trim().is_empty() {
            return Err(ClientError::Config("API key and key ID are required".into()));
        }

        for (name, value) in [("api_key", &self.api_key), ("key_id", &self.key_id)] {
            if HeaderValue::from_str(value).is_err() {
                return Err(ClientError::Config(format!(
                    "{} contains characters not allowed in an HTTP header",
                    name
                )));
            }
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::Config(
                "base_url must start with http:// or https://".into(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ClientError::Config(
                "request_timeout must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("key_id", &self.key_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Reconnect policy for task streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Consecutive reconnect attempts before the stream gives up
    pub max_reconnects: u32,

    /// Delay before reconnecting when the server has not sent a `retry` field
    pub default_retry: Duration,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            max_reconnects: 3,
            default_retry: Duration::from_secs(3),
        }
    }
}

impl StreamOptions {
    /// Never reconnect; the first disconnect closes the stream
    pub fn no_reconnect() -> Self {
        Self {
            max_reconnects: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::new("key", "id");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::new("key", "id");

        config.api_key = String::new();
        assert!(config.validate().is_err());
        config.api_key = "key".to_string();

        config.key_id = "bad\nid".to_string();
        assert!(config.validate().is_err());
        config.key_id = "id".to_string();

        config.base_url = "localhost:4000".to_string();
        assert!(config.validate().is_err());
        config.base_url = "http://localhost:4000".to_string();
        assert!(config.validate().is_ok());

        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("super-secret", "id");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

//! Configuration module
//!
//! Handles CLI configuration and turns it into an API client.

use std::time::Duration;

use anyhow::{Context, Result};
use aurax_client::{AuraxClient, ClientConfig};

/// CLI configuration
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub key_id: String,
    /// Base URL of the Aurax API
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Build an API client from this configuration
    pub fn client(&self) -> Result<AuraxClient> {
        let client_config = ClientConfig::new(self.api_key.clone(), self.key_id.clone())
            .with_base_url(self.base_url.clone())
            .with_request_timeout(self.request_timeout);

        AuraxClient::new(client_config).context("Invalid client configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api_key: "key".to_string(),
            key_id: "key-id".to_string(),
            base_url: "http://localhost:8080/".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_client_from_config() {
        let client = config().client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_rejects_blank_credentials() {
        let mut config = config();
        config.api_key = "  ".to_string();
        assert!(config.client().is_err());
    }
}

//! Aurax HTTP Client
//!
//! A type-safe client for the Aurax image-processing API. Jobs such as
//! virtual try-on and image generation run asynchronously on the service;
//! this crate submits them and tracks them to completion, either by polling
//! or by following the task's server-sent event stream.
//!
//! # Example
//!
//! ```no_run
//! use aurax_client::{AuraxClient, ClientConfig, PollConfig};
//! use aurax_core::domain::product::ProductType;
//! use aurax_core::dto::vto::{GarmentStrength, VtoRequest};
//!
//! #[tokio::main]
//! async fn main() -> aurax_client::Result<()> {
//!     let client = AuraxClient::new(ClientConfig::from_env()?)?;
//!
//!     let task = client
//!         .vto(VtoRequest::new(
//!             "base64-person",
//!             "base64-garment",
//!             ProductType::Garment,
//!             GarmentStrength::Medium,
//!         ))
//!         .await?;
//!
//!     let snapshot = client.poll_task(&task.task_id, &PollConfig::default()).await?;
//!     println!("{} finished with {}", snapshot.id, snapshot.status);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
mod images;
pub mod poller;
pub mod stream;
mod submit;
mod tasks;

// Re-export commonly used types
pub use config::{ClientConfig, StreamOptions};
pub use error::{ClientError, Result};
pub use poller::{PollConfig, TaskStatusSource, TerminalPredicate, poll_until_terminal};
pub use stream::{
    StreamCloser, StreamEvent, StreamFault, StreamHandler, StreamState, TaskEventStream,
};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the key identifier
pub const KEY_ID_HEADER: &str = "x-key-id";

/// HTTP client for the Aurax API
///
/// Cloning is cheap; clones share the underlying connection pool. Methods are
/// grouped by concern:
/// - Submission (virtual try-on, image generation, product description)
/// - Task status (single query, polling, event streams)
/// - Image retrieval
#[derive(Debug, Clone)]
pub struct AuraxClient {
    /// Base URL of the API (e.g., "https://backend.aurax.co.in")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Credential headers attached to every request
    auth_headers: HeaderMap,
    request_timeout: Duration,
    stream_options: StreamOptions,
}

impl AuraxClient {
    /// Create a new client
    ///
    /// Fails if the configuration does not validate.
    ///
    /// # Example
    /// ```
    /// use aurax_client::{AuraxClient, ClientConfig};
    ///
    /// let client = AuraxClient::new(
    ///     ClientConfig::new("api-key", "key-id").with_base_url("http://localhost:4000/"),
    /// )
    /// .unwrap();
    /// assert_eq!(client.base_url(), "http://localhost:4000");
    /// ```
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc. Do not set a
    /// global timeout on the client: it would also cut long-lived task streams.
    /// Use [`ClientConfig::request_timeout`] instead.
    pub fn with_client(config: ClientConfig, client: Client) -> Result<Self> {
        config.validate()?;

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| ClientError::Config(format!("invalid api_key: {}", e)))?;
        api_key.set_sensitive(true);
        let key_id = HeaderValue::from_str(&config.key_id)
            .map_err(|e| ClientError::Config(format!("invalid key_id: {}", e)))?;

        let mut auth_headers = HeaderMap::new();
        auth_headers.insert(API_KEY_HEADER, api_key);
        auth_headers.insert(KEY_ID_HEADER, key_id);

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            auth_headers,
            request_timeout: config.request_timeout,
            stream_options: StreamOptions::default(),
        })
    }

    /// Replace the reconnect policy used by [`AuraxClient::stream_task`]
    pub fn with_stream_options(mut self, options: StreamOptions) -> Self {
        self.stream_options = options;
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stream_options(&self) -> StreamOptions {
        self.stream_options
    }

    // =============================================================================
    // Request Builders
    // =============================================================================

    /// Start a GET request for a synchronous endpoint
    fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.get(url)).timeout(self.request_timeout)
    }

    /// Start a POST request for a synchronous endpoint
    fn post(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.post(url)).timeout(self.request_timeout)
    }

    /// Attach the credential headers
    ///
    /// Used for every request, including stream handshakes and reconnects.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.headers(self.auth_headers.clone())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Turn a non-success response into the matching [`ClientError`]
    ///
    /// The body is read and kept verbatim in the error.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read error body: {}>", e));
        tracing::debug!(status = status.as_u16(), "API returned an error response");
        Err(ClientError::from_response(status.as_u16(), body))
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body)
            .map_err(|e| ClientError::Parse(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns plain text
    async fn handle_text_response(response: Response) -> Result<String> {
        let response = Self::check_status(response).await?;
        Ok(response.text().await?)
    }
}

/// Percent-encode an identifier for use as one path segment
fn path_segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

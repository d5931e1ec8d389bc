//! # HTTP Client Utilities
//!
//! HTTP plumbing for providers whose upstream runs out of process.
//!
//! [`HttpClient`] wraps a timeout-configured `reqwest::Client` and maps
//! transport failures onto [`ProviderError`]. [`HttpTransport`] uses it to
//! post native bodies to a configured endpoint and return the raw status and
//! body as a [`WireReply`]; status interpretation stays with the adapter.
//!
//! # Examples
//!
//! ```ignore
//! use rate_compare::infrastructure::providers::http_client::{HttpClient, HttpTransport};
//!
//! let client = HttpClient::new(10_000)?;
//! let transport = HttpTransport::new(client, "http://localhost:9001/exchange/rate");
//! ```

use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::transport::{
    UpstreamTransport, WireFormat, WireReply, WireRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// HTTP client wrapper for provider transports.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ProviderError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Posts a raw body and returns the status and body, whatever the status.
    ///
    /// The reply format is taken from the response `Content-Type`, falling
    /// back to the request format.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Timeout` or `ProviderError::Connection` if no
    /// response was received.
    pub async fn post_raw(&self, url: &str, request: WireRequest) -> ProviderResult<WireReply> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, request.format.content_type())
            .body(request.body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status().as_u16();
        let format = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(WireFormat::from_content_type)
            .unwrap_or(request.format);
        let body = response
            .text()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        Ok(WireReply::new(status, format, body))
    }

    /// Makes a simple health check GET request.
    ///
    /// Returns `true` if the request succeeds with a 2xx status code.
    pub async fn health_check(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Maps a reqwest error to a ProviderError.
    fn map_reqwest_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout_with_duration("Request timed out", self.timeout_ms)
        } else if error.is_connect() {
            ProviderError::connection(format!("Connection failed: {error}"))
        } else {
            ProviderError::connection(format!("HTTP request failed: {error}"))
        }
    }
}

/// Transport posting native bodies to a remote upstream.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
    endpoint: String,
}

impl HttpTransport {
    /// Creates a transport for the given endpoint URL.
    #[must_use]
    pub fn new(client: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the endpoint URL.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the health probe URL, `<endpoint>/health`.
    #[must_use]
    pub fn health_url(&self) -> String {
        format!("{}/health", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn send(&self, request: WireRequest) -> ProviderResult<WireReply> {
        self.client.post_raw(&self.endpoint, request).await
    }

    async fn health(&self) -> bool {
        self.client.health_check(&self.health_url()).await
    }
}

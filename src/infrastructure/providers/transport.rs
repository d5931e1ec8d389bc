//! # Upstream Transport
//!
//! Moves native request bodies between an adapter and its upstream.
//!
//! Adapters never talk to an upstream directly. They encode a [`WireRequest`],
//! hand it to an [`UpstreamTransport`] and decode the [`WireReply`]. Two
//! transports exist:
//!
//! - [`InProcessTransport`] calls an [`UpstreamService`] in the same process
//! - [`HttpTransport`](super::http_client::HttpTransport) posts to a remote endpoint

use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Encoding of a native body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// `application/json`.
    Json,
    /// `application/xml`.
    Xml,
}

impl WireFormat {
    /// Returns the MIME type for this format.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Picks the format from a `Content-Type` header value.
    #[must_use]
    pub fn from_content_type(value: &str) -> Option<Self> {
        let mime = value.split(';').next().unwrap_or_default().trim();
        if mime.eq_ignore_ascii_case("application/json") {
            Some(Self::Json)
        } else if mime.eq_ignore_ascii_case("application/xml")
            || mime.eq_ignore_ascii_case("text/xml")
        {
            Some(Self::Xml)
        } else {
            None
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

/// A native request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    /// Body encoding.
    pub format: WireFormat,
    /// Encoded body.
    pub body: String,
}

impl WireRequest {
    /// Creates a JSON request.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            format: WireFormat::Json,
            body: body.into(),
        }
    }

    /// Creates an XML request.
    #[must_use]
    pub fn xml(body: impl Into<String>) -> Self {
        Self {
            format: WireFormat::Xml,
            body: body.into(),
        }
    }
}

/// A native reply with its HTTP-like status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireReply {
    /// Status code.
    pub status: u16,
    /// Body encoding.
    pub format: WireFormat,
    /// Encoded body.
    pub body: String,
}

impl WireReply {
    /// Creates a reply.
    #[must_use]
    pub fn new(status: u16, format: WireFormat, body: impl Into<String>) -> Self {
        Self {
            status,
            format,
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body of a successful reply, or maps the status onto a
    /// [`ProviderError`].
    ///
    /// # Errors
    ///
    /// - 400, 404, 422 - `UnsupportedPair`
    /// - 408, 504 - `Timeout`
    /// - other 5xx - `Connection`
    /// - anything else - `Protocol`
    pub fn into_success_body(self, provider: &ProviderId) -> ProviderResult<String> {
        if self.is_success() {
            return Ok(self.body);
        }
        let Self { status, body, .. } = self;
        match status {
            400 | 404 | 422 => Err(ProviderError::unsupported_pair(format!(
                "{provider} rejected the request ({status}): {body}"
            ))),
            408 | 504 => Err(ProviderError::timeout(format!(
                "{provider} upstream timed out ({status})"
            ))),
            500..=599 => Err(ProviderError::connection(format!(
                "{provider} upstream error ({status}): {body}"
            ))),
            _ => Err(ProviderError::protocol(format!(
                "{provider} unexpected status {status}: {body}"
            ))),
        }
    }
}

/// A native upstream endpoint.
#[async_trait]
pub trait UpstreamService: Send + Sync + fmt::Debug {
    /// Returns the provider this upstream serves.
    fn provider_id(&self) -> &ProviderId;

    /// Returns the format this upstream speaks.
    fn format(&self) -> WireFormat;

    /// Handles one native request. Malformed bodies produce a 4xx reply.
    async fn handle(&self, request: WireRequest) -> WireReply;
}

/// Delivers native requests to an upstream.
#[async_trait]
pub trait UpstreamTransport: Send + Sync + fmt::Debug {
    /// Sends a request and returns the raw reply.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` or `Connection` when no reply was received.
    async fn send(&self, request: WireRequest) -> ProviderResult<WireReply>;

    /// Returns true if the upstream is reachable.
    async fn health(&self) -> bool;
}

/// Transport calling an upstream simulator in the same process.
#[derive(Debug, Clone)]
pub struct InProcessTransport {
    upstream: Arc<dyn UpstreamService>,
}

impl InProcessTransport {
    /// Creates a transport for the given upstream.
    #[must_use]
    pub fn new(upstream: Arc<dyn UpstreamService>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl UpstreamTransport for InProcessTransport {
    async fn send(&self, request: WireRequest) -> ProviderResult<WireReply> {
        Ok(self.upstream.handle(request).await)
    }

    async fn health(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::error::FailureKind;

    fn provider() -> ProviderId {
        ProviderId::new("API1")
    }

    fn reply(status: u16) -> WireReply {
        WireReply::new(status, WireFormat::Json, "{}")
    }

    #[test]
    fn success_returns_body() {
        assert_eq!(reply(200).into_success_body(&provider()).unwrap(), "{}");
        assert!(reply(204).is_success());
    }

    #[test]
    fn status_mapping() {
        for status in [400, 404, 422] {
            let error = reply(status).into_success_body(&provider()).unwrap_err();
            assert_eq!(error.kind(), FailureKind::UnsupportedPair, "{status}");
        }
        for status in [408, 504] {
            let error = reply(status).into_success_body(&provider()).unwrap_err();
            assert!(matches!(error, ProviderError::Timeout { .. }), "{status}");
        }
        let error = reply(503).into_success_body(&provider()).unwrap_err();
        assert!(matches!(error, ProviderError::Connection { .. }));
        let error = reply(302).into_success_body(&provider()).unwrap_err();
        assert!(matches!(error, ProviderError::Protocol { .. }));
    }

    #[test]
    fn content_type_round_trip() {
        assert_eq!(
            WireFormat::from_content_type("application/json; charset=utf-8"),
            Some(WireFormat::Json)
        );
        assert_eq!(
            WireFormat::from_content_type("text/xml"),
            Some(WireFormat::Xml)
        );
        assert_eq!(WireFormat::from_content_type("text/plain"), None);
    }
}

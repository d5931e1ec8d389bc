//! # Rate Provider Trait
//!
//! Port definition for rate provider integrations.
//!
//! This module defines the [`RateProvider`] trait that every provider adapter
//! implements. Adapters only translate the canonical [`RateRequest`] into
//! their wire format and return the converted figure; the provided
//! [`RateProvider::request_offer`] method enforces the timeout, measures
//! latency and builds the canonical [`Offer`].
//!
//! # Examples
//!
//! ```ignore
//! use rate_compare::infrastructure::providers::traits::RateProvider;
//!
//! let offer = provider.request_offer(&request).await?;
//! println!("{} answered in {}ms", offer.provider(), offer.response_time_ms());
//! ```

use crate::domain::entities::{Offer, RateRequest};
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// Health status of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderHealthStatus {
    /// Upstream reachable.
    Healthy,
    /// Upstream unreachable or failing.
    Unhealthy,
}

impl fmt::Display for ProviderHealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "HEALTHY"),
            Self::Unhealthy => write!(f, "UNHEALTHY"),
        }
    }
}

/// Health information for a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderHealth {
    provider_id: ProviderId,
    status: ProviderHealthStatus,
    latency_ms: Option<u64>,
    message: Option<String>,
    checked_at: DateTime<Utc>,
}

impl ProviderHealth {
    /// Creates a healthy status with the probe latency.
    #[must_use]
    pub fn healthy_with_latency(provider_id: ProviderId, latency_ms: u64) -> Self {
        Self {
            provider_id,
            status: ProviderHealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            message: None,
            checked_at: Utc::now(),
        }
    }

    /// Creates an unhealthy status.
    #[must_use]
    pub fn unhealthy(provider_id: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider_id,
            status: ProviderHealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(message.into()),
            checked_at: Utc::now(),
        }
    }

    /// Returns the provider ID.
    #[inline]
    #[must_use]
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Returns the health status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ProviderHealthStatus {
        self.status
    }

    /// Returns the probe latency in milliseconds.
    #[inline]
    #[must_use]
    pub fn latency_ms(&self) -> Option<u64> {
        self.latency_ms
    }

    /// Returns the message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns when this health check was performed.
    #[inline]
    #[must_use]
    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// Returns true if the provider is healthy.
    #[inline]
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == ProviderHealthStatus::Healthy
    }
}

impl fmt::Display for ProviderHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProviderHealth({}: {})", self.provider_id, self.status)?;
        if let Some(latency) = self.latency_ms {
            write!(f, " latency={latency}ms")?;
        }
        Ok(())
    }
}

/// Trait defining the interface for rate provider adapters.
///
/// # Error Handling
///
/// Methods return `ProviderResult<T>`. Implementations map their wire-level
/// problems onto [`ProviderError`] variants so that the aggregator can tell
/// an unsupported pair from an unavailable provider.
#[async_trait]
pub trait RateProvider: Send + Sync + fmt::Debug {
    /// Returns the provider ID.
    fn provider_id(&self) -> &ProviderId;

    /// Returns the timeout in milliseconds for one quote request.
    fn timeout_ms(&self) -> u64;

    /// Translates the request into the provider's format, calls the upstream
    /// and returns the converted amount in the target currency.
    ///
    /// `Ok(None)` means the upstream replied without a figure.
    ///
    /// # Errors
    ///
    /// - `ProviderError::UnsupportedPair` - the upstream rejected the pair
    /// - any other variant - the upstream could not be used
    async fn fetch_converted_amount(&self, request: &RateRequest)
    -> ProviderResult<Option<Decimal>>;

    /// Performs a health check on the provider's upstream.
    ///
    /// # Errors
    ///
    /// Returns an error only if the check itself could not be performed.
    async fn health_check(&self) -> ProviderResult<ProviderHealth>;

    /// Requests a canonical offer.
    ///
    /// Enforces [`timeout_ms`](Self::timeout_ms) and measures wall-clock
    /// latency from before the call until the reply is decoded.
    ///
    /// # Errors
    ///
    /// - `ProviderError::Timeout` - no reply within the timeout
    /// - `ProviderError::EmptyResponse` - the upstream had no figure
    /// - `ProviderError::InvalidOffer` - the figure is not positive
    /// - anything [`fetch_converted_amount`](Self::fetch_converted_amount) returns
    async fn request_offer(&self, request: &RateRequest) -> ProviderResult<Offer> {
        let timeout_ms = self.timeout_ms();
        let started = Instant::now();

        let converted = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.fetch_converted_amount(request),
        )
        .await
        .map_err(|_| {
            ProviderError::timeout_with_duration(
                format!("{} did not answer for {}", self.provider_id(), request.pair()),
                timeout_ms,
            )
        })??;

        let response_time = started.elapsed();
        let converted = converted.ok_or_else(|| {
            ProviderError::empty_response(format!(
                "{} returned no result for {}",
                self.provider_id(),
                request.pair()
            ))
        })?;

        Ok(Offer::new(
            self.provider_id().clone(),
            request,
            converted,
            response_time,
        )?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::error::FailureKind;

    #[derive(Debug)]
    struct StubProvider {
        id: ProviderId,
        delay: Duration,
        figure: ProviderResult<Option<Decimal>>,
    }

    #[async_trait]
    impl RateProvider for StubProvider {
        fn provider_id(&self) -> &ProviderId {
            &self.id
        }

        fn timeout_ms(&self) -> u64 {
            50
        }

        async fn fetch_converted_amount(
            &self,
            _request: &RateRequest,
        ) -> ProviderResult<Option<Decimal>> {
            tokio::time::sleep(self.delay).await;
            self.figure.clone()
        }

        async fn health_check(&self) -> ProviderResult<ProviderHealth> {
            Ok(ProviderHealth::healthy_with_latency(self.id.clone(), 0))
        }
    }

    fn stub(delay_ms: u64, figure: ProviderResult<Option<Decimal>>) -> StubProvider {
        StubProvider {
            id: ProviderId::new("STUB"),
            delay: Duration::from_millis(delay_ms),
            figure,
        }
    }

    fn request() -> RateRequest {
        RateRequest::new("USD", "EUR", Decimal::new(10000, 2)).unwrap()
    }

    #[tokio::test]
    async fn request_offer_builds_canonical_offer() {
        let offer = stub(0, Ok(Some(Decimal::new(8500, 2))))
            .request_offer(&request())
            .await
            .unwrap();

        assert_eq!(offer.provider().as_str(), "STUB");
        assert_eq!(offer.converted_amount(), Decimal::new(8500, 2));
        assert_eq!(offer.rate(), Decimal::new(85, 2));
    }

    #[tokio::test]
    async fn request_offer_measures_latency() {
        let offer = stub(20, Ok(Some(Decimal::ONE)))
            .request_offer(&request())
            .await
            .unwrap();
        assert!(offer.response_time_ms() >= 20);
    }

    #[tokio::test]
    async fn missing_figure_is_unavailable() {
        let error = stub(0, Ok(None)).request_offer(&request()).await.unwrap_err();
        assert!(matches!(error, ProviderError::EmptyResponse { .. }));
        assert_eq!(error.kind(), FailureKind::Unavailable);
    }

    #[tokio::test]
    async fn non_positive_figure_is_invalid_offer() {
        let error = stub(0, Ok(Some(Decimal::ZERO)))
            .request_offer(&request())
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::InvalidOffer(_)));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let error = stub(500, Ok(Some(Decimal::ONE)))
            .request_offer(&request())
            .await
            .unwrap_err();
        assert_eq!(error.timeout_ms(), Some(50));
    }

    #[tokio::test]
    async fn rejection_is_passed_through() {
        let error = stub(0, Err(ProviderError::unsupported_pair("no AED")))
            .request_offer(&request())
            .await
            .unwrap_err();
        assert!(error.is_unsupported_pair());
    }

    #[test]
    fn health_display() {
        let health = ProviderHealth::healthy_with_latency(ProviderId::new("API1"), 25);
        let display = health.to_string();
        assert!(display.contains("API1"));
        assert!(display.contains("HEALTHY"));
        assert!(display.contains("25ms"));

        let health = ProviderHealth::unhealthy(ProviderId::new("API3"), "connection refused");
        assert!(!health.is_healthy());
        assert_eq!(health.message(), Some("connection refused"));
    }
}

//! # Rate Aggregation Engine
//!
//! Orchestrates concurrent offer collection and best-offer selection.
//!
//! This module provides the [`RateAggregationEngine`], which fans one
//! [`RateRequest`] out to every configured provider, waits for all of them,
//! and picks a winner with a [`SelectionStrategy`].
//!
//! # Failure Handling
//!
//! Provider failures never abort a comparison. Each provider runs in its own
//! task; an error, a timeout inside the adapter or even a panic is counted
//! as a failed provider and logged. Only when no provider produced an offer
//! does [`RateAggregationEngine::compare`] return an error.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::offer_selection::{
    BestConvertedAmountStrategy, SelectionStrategy,
};
use crate::domain::entities::{ComparisonResult, Offer, RateRequest, elapsed_ms};
use crate::domain::value_objects::{ComparisonId, ProviderId};
use crate::infrastructure::providers::error::{FailureKind, ProviderError};
use crate::infrastructure::providers::traits::{ProviderHealth, RateProvider};
use futures::StreamExt;
use futures::future::join_all;
use futures::stream::FuturesUnordered;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Error type for aggregation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// No provider produced a valid offer.
    NoOffersAvailable {
        /// The requested pair, `SRC/DST`.
        pair: String,
        /// Number of providers queried.
        queried: usize,
        /// Providers that explicitly rejected the pair.
        unsupported: usize,
        /// Providers that failed for any other reason.
        unavailable: usize,
    },
    /// The selection strategy returned an index outside the offers.
    InvalidSelection {
        /// Strategy name.
        strategy: &'static str,
    },
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOffersAvailable { queried: 0, .. } => {
                write!(f, "No providers are configured")
            }
            Self::NoOffersAvailable {
                pair,
                queried,
                unsupported,
                ..
            } if unsupported == queried => {
                write!(f, "No provider supports the currency pair {pair}")
            }
            Self::NoOffersAvailable {
                pair,
                unsupported,
                unavailable,
                ..
            } => write!(
                f,
                "No providers returned valid exchange rates for {pair} \
                 ({unsupported} unsupported, {unavailable} unavailable)"
            ),
            Self::InvalidSelection { strategy } => {
                write!(f, "selection strategy {strategy} picked no offer")
            }
        }
    }
}

impl std::error::Error for AggregationError {}

/// Result type for aggregation operations.
pub type AggregationResult<T> = Result<T, AggregationError>;

/// Outcome of one provider task.
type ProviderOutcome = (ProviderId, Result<Result<Offer, ProviderError>, tokio::task::JoinError>);

/// Engine comparing offers from multiple providers.
#[derive(Debug, Clone)]
pub struct RateAggregationEngine {
    providers: Vec<Arc<dyn RateProvider>>,
    strategy: Arc<dyn SelectionStrategy>,
}

impl RateAggregationEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn RateProvider>>,
        strategy: Arc<dyn SelectionStrategy>,
    ) -> Self {
        Self {
            providers,
            strategy,
        }
    }

    /// Creates an engine picking the highest converted amount.
    #[must_use]
    pub fn with_defaults(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        Self::new(providers, Arc::new(BestConvertedAmountStrategy::new()))
    }

    /// Compares offers from every provider.
    ///
    /// All provider tasks are spawned before any is awaited. Outcomes are
    /// collected in completion order; no provider is cancelled and no timeout
    /// is added beyond each adapter's own.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::NoOffersAvailable` if every provider failed.
    pub async fn compare(&self, request: &RateRequest) -> AggregationResult<ComparisonResult> {
        let comparison_id = ComparisonId::new_v4();
        let span = info_span!("compare", %comparison_id, pair = %request.pair());
        self.collect(*request).instrument(span).await
    }

    async fn collect(&self, request: RateRequest) -> AggregationResult<ComparisonResult> {
        let started = Instant::now();
        let queried = self.providers.len();
        info!(providers = queried, amount = %request.amount(), "comparison started");

        let mut pending: FuturesUnordered<_> = self
            .providers
            .iter()
            .map(|provider| {
                let provider = Arc::clone(provider);
                let provider_id = provider.provider_id().clone();
                let span = info_span!("provider", provider = %provider_id);
                let handle = tokio::spawn(
                    async move { provider.request_offer(&request).await }.instrument(span),
                );
                async move { (provider_id, handle.await) }
            })
            .collect();

        let mut offers = Vec::with_capacity(queried);
        let mut unsupported = 0usize;
        let mut unavailable = 0usize;

        while let Some(outcome) = pending.next().await {
            match Self::classify(outcome) {
                Ok(offer) => offers.push(offer),
                Err(FailureKind::UnsupportedPair) => unsupported += 1,
                Err(FailureKind::Unavailable) => unavailable += 1,
            }
        }

        let elapsed_ms = elapsed_ms(started.elapsed());
        let Some(best_index) = self.strategy.select(&offers) else {
            let error = AggregationError::NoOffersAvailable {
                pair: request.pair(),
                queried,
                unsupported,
                unavailable,
            };
            warn!(unsupported, unavailable, elapsed_ms, "{error}");
            return Err(error);
        };

        let invalid_selection = AggregationError::InvalidSelection {
            strategy: self.strategy.name(),
        };
        let best = offers
            .get(best_index)
            .cloned()
            .ok_or_else(|| invalid_selection.clone())?;
        let result = ComparisonResult::new(best, offers, queried).ok_or(invalid_selection)?;

        info!(
            best_provider = %result.best_offer().provider(),
            best_converted_amount = %result.best_offer().converted_amount(),
            successful = result.successful_providers(),
            failed = result.failed_providers(),
            elapsed_ms,
            "comparison completed"
        );
        Ok(result)
    }

    fn classify((provider_id, joined): ProviderOutcome) -> Result<Offer, FailureKind> {
        match joined {
            Ok(Ok(offer)) => {
                info!(
                    provider = %provider_id,
                    converted_amount = %offer.converted_amount(),
                    rate = %offer.rate(),
                    response_time_ms = offer.response_time_ms(),
                    "offer received"
                );
                Ok(offer)
            }
            Ok(Err(e)) => {
                warn!(
                    provider = %provider_id,
                    kind = %e.kind(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "provider failed"
                );
                Err(e.kind())
            }
            Err(e) => {
                error!(provider = %provider_id, error = %e, "provider task aborted");
                Err(FailureKind::Unavailable)
            }
        }
    }

    /// Requests an offer from a single provider.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::ProviderNotFound` for an unknown name
    /// - `ApplicationError::Provider` if the provider failed
    pub async fn quote_from(&self, provider: &str, request: &RateRequest) -> ApplicationResult<Offer> {
        let adapter = self
            .provider(provider)
            .ok_or_else(|| ApplicationError::provider_not_found(provider))?;
        let span = info_span!("quote", provider = %adapter.provider_id(), pair = %request.pair());
        async move {
            let offer = adapter.request_offer(request).await.map_err(|e| {
                warn!(kind = %e.kind(), error = %e, "provider failed");
                e
            })?;
            info!(converted_amount = %offer.converted_amount(), "offer received");
            Ok::<_, ApplicationError>(offer)
        }
        .instrument(span)
        .await
    }

    /// Checks every provider concurrently.
    pub async fn health(&self) -> Vec<ProviderHealth> {
        let checks = join_all(self.providers.iter().map(|provider| async move {
            provider.health_check().await.unwrap_or_else(|e| {
                ProviderHealth::unhealthy(provider.provider_id().clone(), e.to_string())
            })
        }))
        .await;
        for check in &checks {
            debug!(
                provider = %check.provider_id(),
                status = %check.status(),
                latency_ms = ?check.latency_ms(),
                checked_at = %check.checked_at(),
                message = ?check.message(),
                "provider health checked"
            );
        }
        checks
    }

    /// Looks up a provider by case-insensitive name.
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<Arc<dyn RateProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.provider_id().matches(name))
            .cloned()
    }

    /// Returns the configured provider IDs in query order.
    #[must_use]
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers
            .iter()
            .map(|provider| provider.provider_id().clone())
            .collect()
    }

    /// Returns the selection strategy name.
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}

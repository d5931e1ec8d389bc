//! # REST Handlers
//!
//! Request handlers, shared state and request/response bodies.

use crate::api::rest::error::{ApiError, ApiResult};
use crate::application::error::ApplicationError;
use crate::application::services::{ComparisonEnvelope, RateAggregationEngine, assemble};
use crate::domain::entities::{Offer, RateRequest, elapsed_ms};
use crate::domain::errors::DomainResult;
use crate::infrastructure::providers::traits::ProviderHealth;
use crate::infrastructure::providers::transport::{UpstreamService, WireRequest};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared state for all handlers.
pub struct AppState {
    engine: RateAggregationEngine,
    upstreams: Vec<Arc<dyn UpstreamService>>,
    compare_timeout: Duration,
}

impl AppState {
    /// Creates the shared state.
    #[must_use]
    pub fn new(
        engine: RateAggregationEngine,
        upstreams: Vec<Arc<dyn UpstreamService>>,
        compare_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            upstreams,
            compare_timeout,
        }
    }

    /// Returns the aggregation engine.
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &RateAggregationEngine {
        &self.engine
    }

    /// Returns the caller-side comparison deadline.
    #[inline]
    #[must_use]
    pub fn compare_timeout(&self) -> Duration {
        self.compare_timeout
    }

    /// Looks up a native upstream by case-insensitive provider name.
    #[must_use]
    pub fn upstream(&self, name: &str) -> Option<Arc<dyn UpstreamService>> {
        self.upstreams
            .iter()
            .find(|upstream| upstream.provider_id().matches(name))
            .cloned()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("providers", &self.engine.provider_ids())
            .field("upstreams", &self.upstreams.len())
            .field("compare_timeout", &self.compare_timeout)
            .finish()
    }
}

/// Conversion request body.
///
/// `amount` may be sent as a JSON string or a number.
#[derive(Debug, Clone, Deserialize)]
pub struct RateRequestBody {
    /// Currency to convert from.
    #[serde(default)]
    pub source_currency: String,
    /// Currency to convert to.
    #[serde(default)]
    pub target_currency: String,
    /// Amount in the source currency.
    pub amount: Decimal,
}

impl RateRequestBody {
    /// Validates the body into a request.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn to_request(&self) -> DomainResult<RateRequest> {
        RateRequest::new(&self.source_currency, &self.target_currency, self.amount)
    }
}

/// `GET /` response.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    /// Service description.
    pub message: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Available endpoints.
    pub endpoints: Vec<&'static str>,
    /// Providers queried by `/exchange/compare`.
    pub providers: Vec<String>,
}

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when every provider is healthy, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Selection strategy name.
    pub strategy: &'static str,
    /// Per-provider health.
    pub providers: Vec<ProviderHealth>,
}

/// Native upstream health response.
#[derive(Debug, Serialize)]
pub struct UpstreamHealthResponse {
    /// Always `healthy`.
    pub status: &'static str,
    /// Provider served by the upstream.
    pub provider: String,
    /// Native format.
    pub format: &'static str,
}

/// `GET /`
#[allow(clippy::unused_async)]
pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "RateCompare - exchange rate comparison service",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "GET /health",
            "POST /exchange/compare",
            "POST /exchange/rate/{provider}",
            "POST /upstream/{provider}/exchange/rate",
        ],
        providers: state
            .engine()
            .provider_ids()
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let providers = state.engine().health().await;
    let status = if providers.iter().all(ProviderHealth::is_healthy) {
        "healthy"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        strategy: state.engine().strategy_name(),
        providers,
    })
}

/// `POST /exchange/compare`
///
/// # Errors
///
/// Returns 400 for invalid input or when no provider produced an offer, and
/// 504 when the comparison exceeds the configured deadline.
pub async fn compare_rates(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RateRequestBody>, JsonRejection>,
) -> ApiResult<Json<ComparisonEnvelope>> {
    let Json(body) = payload?;
    let request = body.to_request()?;
    info!(pair = %request.pair(), amount = %request.amount(), "comparison requested");

    let deadline = state.compare_timeout();
    let result = tokio::time::timeout(deadline, state.engine().compare(&request))
        .await
        .map_err(|_| ApplicationError::Timeout(elapsed_ms(deadline)))?
        .map_err(ApplicationError::from)?;
    let envelope = assemble(result);
    info!(
        status_code = envelope.status_code(),
        best_provider = %envelope.data().best_offer().provider(),
        successful = envelope.data().successful_providers(),
        "{}",
        envelope.message()
    );
    Ok(Json(envelope))
}

/// `POST /exchange/rate/{provider}`
///
/// # Errors
///
/// Returns 404 for an unknown provider, 400 when the provider rejects the
/// pair and 503 when it is unavailable.
pub async fn provider_rate(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    payload: Result<Json<RateRequestBody>, JsonRejection>,
) -> ApiResult<Json<Offer>> {
    let Json(body) = payload?;
    let request = body.to_request()?;
    let offer = state.engine().quote_from(&provider, &request).await?;
    Ok(Json(offer))
}

/// `POST /upstream/{provider}/exchange/rate`
///
/// Passes the raw body to the provider's native simulator and relays its
/// status, body and content type unchanged.
///
/// # Errors
///
/// Returns 404 for an unknown provider.
pub async fn upstream_rate(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    body: String,
) -> ApiResult<Response> {
    let upstream = state
        .upstream(&provider)
        .ok_or_else(|| ApiError::from(ApplicationError::provider_not_found(&provider)))?;

    let reply = upstream
        .handle(WireRequest {
            format: upstream.format(),
            body,
        })
        .await;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok((
        status,
        [(header::CONTENT_TYPE, reply.format.content_type())],
        reply.body,
    )
        .into_response())
}

/// `GET /upstream/{provider}/exchange/rate/health`
///
/// # Errors
///
/// Returns 404 for an unknown provider.
#[allow(clippy::unused_async)]
pub async fn upstream_health(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> ApiResult<Json<UpstreamHealthResponse>> {
    let upstream = state
        .upstream(&provider)
        .ok_or_else(|| ApiError::from(ApplicationError::provider_not_found(&provider)))?;
    Ok(Json(UpstreamHealthResponse {
        status: "healthy",
        provider: upstream.provider_id().to_string(),
        format: upstream.format().content_type(),
    }))
}

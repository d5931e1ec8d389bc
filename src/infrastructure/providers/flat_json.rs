//! # Flat JSON Provider
//!
//! Provider speaking a flat JSON shape that quotes a unit rate.
//!
//! ```text
//! request:  {"from": "USD", "to": "EUR", "value": 100.0}
//! response: {"rate": 0.85}
//! ```
//!
//! The converted amount is `rate × amount`.

use crate::domain::entities::{RateRequest, elapsed_ms};
use crate::domain::value_objects::{CheckedArithmetic, ProviderId};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::simulation::{DeskRejection, SimulatedDesk};
use crate::infrastructure::providers::traits::{ProviderHealth, RateProvider};
use crate::infrastructure::providers::transport::{
    UpstreamService, UpstreamTransport, WireFormat, WireReply, WireRequest,
};
use async_trait::async_trait;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Native request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatJsonRequest {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Amount in the source currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// Native response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatJsonResponse {
    /// Units of target per unit of source.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub rate: Option<Decimal>,
}

/// Native error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatJsonFault {
    /// Reason for the rejection.
    pub detail: String,
}

/// Adapter for the flat JSON provider.
#[derive(Debug, Clone)]
pub struct FlatJsonProvider {
    provider_id: ProviderId,
    timeout_ms: u64,
    transport: Arc<dyn UpstreamTransport>,
}

impl FlatJsonProvider {
    /// Creates an adapter.
    #[must_use]
    pub fn new(
        provider_id: ProviderId,
        timeout_ms: u64,
        transport: Arc<dyn UpstreamTransport>,
    ) -> Self {
        Self {
            provider_id,
            timeout_ms,
            transport,
        }
    }

    fn encode(request: &RateRequest) -> ProviderResult<WireRequest> {
        let body = FlatJsonRequest {
            from: request.source_currency().to_string(),
            to: request.target_currency().to_string(),
            value: request.amount().get(),
        };
        serde_json::to_string(&body)
            .map(WireRequest::json)
            .map_err(|e| ProviderError::internal(format!("Failed to encode request: {e}")))
    }

    fn decode(&self, body: &str, amount: Decimal) -> ProviderResult<Option<Decimal>> {
        let response: FlatJsonResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::protocol(format!("{} sent malformed JSON: {e}", self.provider_id))
        })?;

        response
            .rate
            .map(|rate| {
                rate.safe_mul(amount).map_err(|e| {
                    ProviderError::protocol(format!("{} rate {rate}: {e}", self.provider_id))
                })
            })
            .transpose()
    }
}

#[async_trait]
impl RateProvider for FlatJsonProvider {
    fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    async fn fetch_converted_amount(
        &self,
        request: &RateRequest,
    ) -> ProviderResult<Option<Decimal>> {
        let reply = self.transport.send(Self::encode(request)?).await?;
        let body = reply.into_success_body(&self.provider_id)?;
        self.decode(&body, request.amount().get())
    }

    async fn health_check(&self) -> ProviderResult<ProviderHealth> {
        let started = Instant::now();
        if self.transport.health().await {
            Ok(ProviderHealth::healthy_with_latency(
                self.provider_id.clone(),
                elapsed_ms(started.elapsed()),
            ))
        } else {
            Ok(ProviderHealth::unhealthy(
                self.provider_id.clone(),
                "upstream health probe failed",
            ))
        }
    }
}

/// Upstream simulator for the flat JSON provider.
#[derive(Debug, Clone)]
pub struct FlatJsonUpstream {
    desk: SimulatedDesk,
}

impl FlatJsonUpstream {
    /// Creates an upstream around a desk.
    #[must_use]
    pub fn new(desk: SimulatedDesk) -> Self {
        Self { desk }
    }

    fn fault(status: StatusCode, detail: impl Into<String>) -> WireReply {
        let body = FlatJsonFault {
            detail: detail.into(),
        };
        WireReply::new(
            status.as_u16(),
            WireFormat::Json,
            serde_json::to_string(&body).unwrap_or_default(),
        )
    }
}

#[async_trait]
impl UpstreamService for FlatJsonUpstream {
    fn provider_id(&self) -> &ProviderId {
        self.desk.provider_id()
    }

    fn format(&self) -> WireFormat {
        WireFormat::Json
    }

    async fn handle(&self, request: WireRequest) -> WireReply {
        let parsed: FlatJsonRequest = match serde_json::from_str(&request.body) {
            Ok(parsed) => parsed,
            Err(e) => return Self::fault(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        };
        if parsed.value <= Decimal::ZERO {
            return Self::fault(StatusCode::UNPROCESSABLE_ENTITY, "value must be positive");
        }
        debug!(
            provider = %self.desk.provider_id(),
            from = %parsed.from,
            to = %parsed.to,
            value = %parsed.value,
            "flat json request received"
        );

        match self.desk.quote_codes(&parsed.from, &parsed.to).await {
            Ok(rate) => {
                let body = FlatJsonResponse { rate: Some(rate) };
                match serde_json::to_string(&body) {
                    Ok(body) => WireReply::new(StatusCode::OK.as_u16(), WireFormat::Json, body),
                    Err(e) => Self::fault(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
                }
            }
            Err(rejection @ DeskRejection::TransientFailure(_)) => {
                warn!(provider = %self.desk.provider_id(), "{rejection}");
                Self::fault(StatusCode::SERVICE_UNAVAILABLE, rejection.to_string())
            }
            Err(rejection) => {
                warn!(provider = %self.desk.provider_id(), "{rejection}");
                Self::fault(StatusCode::BAD_REQUEST, rejection.to_string())
            }
        }
    }
}

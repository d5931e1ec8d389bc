//! # Nested JSON Provider
//!
//! Provider wrapping its answer in a status envelope.
//!
//! ```text
//! request:  {"exchange": {"sourceCurrency": "USD", "targetCurrency": "EUR", "quantity": 100.0}}
//! response: {"statusCode": 200, "message": "Success", "data": {"total": 86.5}}
//! ```
//!
//! The envelope `statusCode` is authoritative: a reply with HTTP 200 but an
//! envelope status other than 200 is a rejection.

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

/// Fractional digits kept on the total the desk replies with.
const TOTAL_SCALE: u32 = 6;

/// Native request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedJsonRequest {
    /// The conversion being asked for.
    pub exchange: ExchangeBlock,
}

/// Inner block of [`NestedJsonRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeBlock {
    /// Source currency code.
    pub source_currency: String,
    /// Target currency code.
    pub target_currency: String,
    /// Amount in the source currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
}

/// Native response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedJsonResponse {
    /// Business status, 200 on success.
    pub status_code: u16,
    /// Human-readable status.
    #[serde(default)]
    pub message: String,
    /// Payload, absent on rejection.
    #[serde(default)]
    pub data: Option<TotalBlock>,
}

/// Payload of [`NestedJsonResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalBlock {
    /// Converted amount in the target currency.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
}

impl NestedJsonResponse {
    fn success(total: Decimal) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: "Success".to_string(),
            data: Some(TotalBlock { total: Some(total) }),
        }
    }

    fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

/// Adapter for the nested JSON provider.
#[derive(Debug, Clone)]
pub struct NestedJsonProvider {
    provider_id: ProviderId,
    timeout_ms: u64,
    transport: Arc<dyn UpstreamTransport>,
}

impl NestedJsonProvider {
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
        let body = NestedJsonRequest {
            exchange: ExchangeBlock {
                source_currency: request.source_currency().to_string(),
                target_currency: request.target_currency().to_string(),
                quantity: request.amount().get(),
            },
        };
        serde_json::to_string(&body)
            .map(WireRequest::json)
            .map_err(|e| ProviderError::internal(format!("Failed to encode request: {e}")))
    }

    /// Unwraps the envelope.
    ///
    /// An envelope status of 400, 404 or 422 is an unsupported pair, any
    /// other non-200 status makes the provider unavailable.
    fn decode(&self, body: &str) -> ProviderResult<Option<Decimal>> {
        let envelope: NestedJsonResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::protocol(format!("{} sent malformed JSON: {e}", self.provider_id))
        })?;

        match envelope.status_code {
            200 => Ok(envelope.data.and_then(|data| data.total)),
            400 | 404 | 422 => Err(ProviderError::unsupported_pair(format!(
                "{} rejected the pair: {}",
                self.provider_id, envelope.message
            ))),
            status => Err(ProviderError::connection(format!(
                "{} envelope status {status}: {}",
                self.provider_id, envelope.message
            ))),
        }
    }
}

#[async_trait]
impl RateProvider for NestedJsonProvider {
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
        self.decode(&body)
    }

    async fn health_check(&self) -> ProviderResult<ProviderHealth> {
        let started = Instant::now();
        if !self.transport.health().await {
            return Ok(ProviderHealth::unhealthy(
                self.provider_id.clone(),
                "upstream health probe failed",
            ));
        }
        Ok(ProviderHealth::healthy_with_latency(
            self.provider_id.clone(),
            elapsed_ms(started.elapsed()),
        ))
    }
}

/// Upstream simulator for the nested JSON provider.
///
/// Unsupported pairs are answered with HTTP 200 and envelope status 400;
/// transient outages with HTTP 503.
#[derive(Debug, Clone)]
pub struct NestedJsonUpstream {
    desk: SimulatedDesk,
}

impl NestedJsonUpstream {
    /// Creates an upstream around a desk.
    #[must_use]
    pub fn new(desk: SimulatedDesk) -> Self {
        Self { desk }
    }

    fn reply(http_status: StatusCode, envelope: &NestedJsonResponse) -> WireReply {
        match serde_json::to_string(envelope) {
            Ok(body) => WireReply::new(http_status.as_u16(), WireFormat::Json, body),
            Err(e) => WireReply::new(
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                WireFormat::Json,
                e.to_string(),
            ),
        }
    }
}

#[async_trait]
impl UpstreamService for NestedJsonUpstream {
    fn provider_id(&self) -> &ProviderId {
        self.desk.provider_id()
    }

    fn format(&self) -> WireFormat {
        WireFormat::Json
    }

    async fn handle(&self, request: WireRequest) -> WireReply {
        let parsed: NestedJsonRequest = match serde_json::from_str(&request.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                let envelope =
                    NestedJsonResponse::failure(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
                return Self::reply(StatusCode::UNPROCESSABLE_ENTITY, &envelope);
            }
        };
        let exchange = parsed.exchange;
        debug!(
            provider = %self.desk.provider_id(),
            source_currency = %exchange.source_currency,
            target_currency = %exchange.target_currency,
            quantity = %exchange.quantity,
            "nested json request received"
        );
        if exchange.quantity <= Decimal::ZERO {
            let envelope =
                NestedJsonResponse::failure(StatusCode::BAD_REQUEST, "quantity must be positive");
            return Self::reply(StatusCode::OK, &envelope);
        }

        let quote = self
            .desk
            .quote_codes(&exchange.source_currency, &exchange.target_currency)
            .await;
        match quote {
            Ok(rate) => match rate.safe_mul(exchange.quantity) {
                Ok(total) => Self::reply(
                    StatusCode::OK,
                    &NestedJsonResponse::success(total.round_dp(TOTAL_SCALE)),
                ),
                Err(e) => Self::reply(
                    StatusCode::OK,
                    &NestedJsonResponse::failure(StatusCode::BAD_REQUEST, e.to_string()),
                ),
            },
            Err(rejection @ DeskRejection::TransientFailure(_)) => {
                warn!(provider = %self.desk.provider_id(), "{rejection}");
                let envelope = NestedJsonResponse::failure(
                    StatusCode::SERVICE_UNAVAILABLE,
                    rejection.to_string(),
                );
                Self::reply(StatusCode::SERVICE_UNAVAILABLE, &envelope)
            }
            Err(rejection) => {
                warn!(provider = %self.desk.provider_id(), "{rejection}");
                let envelope =
                    NestedJsonResponse::failure(StatusCode::BAD_REQUEST, rejection.to_string());
                Self::reply(StatusCode::OK, &envelope)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::error::FailureKind;
    use crate::infrastructure::providers::rate_table::RateTable;
    use crate::infrastructure::providers::simulation::{FixedSimulation, SimulationProfile};
    use crate::infrastructure::providers::transport::InProcessTransport;

    fn upstream(simulation: FixedSimulation) -> Arc<NestedJsonUpstream> {
        Arc::new(NestedJsonUpstream::new(SimulatedDesk::new(
            ProviderId::new("API3"),
            RateTable::nested_json_defaults().unwrap(),
            SimulationProfile::new(0, 0, 0.025, 0.1),
            Arc::new(simulation),
        )))
    }

    fn provider(simulation: FixedSimulation) -> NestedJsonProvider {
        NestedJsonProvider::new(
            ProviderId::new("API3"),
            1000,
            Arc::new(InProcessTransport::new(upstream(simulation))),
        )
    }

    fn request(source: &str, target: &str) -> RateRequest {
        RateRequest::new(source, target, Decimal::new(10000, 2)).unwrap()
    }

    #[test]
    fn encodes_nested_camel_case_shape() {
        let wire = NestedJsonProvider::encode(&request("USD", "EUR")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&wire.body).unwrap();
        assert_eq!(json["exchange"]["sourceCurrency"], "USD");
        assert_eq!(json["exchange"]["targetCurrency"], "EUR");
        assert_eq!(json["exchange"]["quantity"].as_f64(), Some(100.0));
    }

    #[test]
    fn envelope_status_decides_outcome() {
        let adapter = provider(FixedSimulation::default());

        let ok = r#"{"statusCode":200,"message":"Success","data":{"total":86.5}}"#;
        assert_eq!(adapter.decode(ok).unwrap(), Some(Decimal::new(865, 1)));

        let empty = r#"{"statusCode":200,"message":"Success","data":{}}"#;
        assert_eq!(adapter.decode(empty).unwrap(), None);

        let rejected = r#"{"statusCode":400,"message":"not supported","data":null}"#;
        assert_eq!(
            adapter.decode(rejected).unwrap_err().kind(),
            FailureKind::UnsupportedPair
        );

        let broken = r#"{"statusCode":500,"message":"boom"}"#;
        assert_eq!(
            adapter.decode(broken).unwrap_err().kind(),
            FailureKind::Unavailable
        );
    }

    #[tokio::test]
    async fn total_is_the_converted_amount() {
        let offer = provider(FixedSimulation::default())
            .request_offer(&request("USD", "EUR"))
            .await
            .unwrap();
        assert_eq!(offer.converted_amount(), Decimal::new(865, 1));
        assert_eq!(offer.rate(), Decimal::new(865, 3));
    }

    #[tokio::test]
    async fn unsupported_pair_travels_inside_a_200() {
        let reply = upstream(FixedSimulation::default())
            .handle(NestedJsonProvider::encode(&request("AED", "QAR")).unwrap())
            .await;
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("\"statusCode\":400"));

        let error = provider(FixedSimulation::default())
            .request_offer(&request("AED", "QAR"))
            .await
            .unwrap_err();
        assert!(error.is_unsupported_pair());
    }

    #[tokio::test]
    async fn transient_failure_is_unavailable_even_for_supported_pairs() {
        let error = provider(FixedSimulation::failing())
            .request_offer(&request("USD", "EUR"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::Unavailable);
        assert!(error.is_retryable());
    }
}

//! # XML Provider
//!
//! Provider speaking XML and quoting the converted amount directly.
//!
//! ```text
//! request:  <XML><From>USD</From><To>EUR</To><Amount>100.00</Amount></XML>
//! response: <XML><Result>87.50</Result></XML>
//! ```

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

/// Fractional digits kept on the converted amount the desk replies with.
const RESULT_SCALE: u32 = 6;

/// Native request document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "XML")]
pub struct XmlRequest {
    /// Source currency code.
    #[serde(rename = "From")]
    pub from: String,
    /// Target currency code.
    #[serde(rename = "To")]
    pub to: String,
    /// Amount in the source currency.
    #[serde(rename = "Amount", with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

/// Native response document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "XML")]
pub struct XmlResponse {
    /// Converted amount in the target currency.
    #[serde(
        rename = "Result",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub result: Option<Decimal>,
}

/// Native error document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "XML")]
pub struct XmlFault {
    /// Reason for the rejection.
    #[serde(rename = "Error")]
    pub error: String,
}

/// Adapter for the XML provider.
#[derive(Debug, Clone)]
pub struct XmlProvider {
    provider_id: ProviderId,
    timeout_ms: u64,
    transport: Arc<dyn UpstreamTransport>,
}

impl XmlProvider {
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
        let document = XmlRequest {
            from: request.source_currency().to_string(),
            to: request.target_currency().to_string(),
            amount: request.amount().get(),
        };
        quick_xml::se::to_string(&document)
            .map(WireRequest::xml)
            .map_err(|e| ProviderError::internal(format!("Failed to encode request: {e}")))
    }

    fn decode(&self, body: &str) -> ProviderResult<Option<Decimal>> {
        quick_xml::de::from_str::<XmlResponse>(body)
            .map(|document| document.result)
            .map_err(|e| {
                ProviderError::protocol(format!("{} sent malformed XML: {e}", self.provider_id))
            })
    }
}

#[async_trait]
impl RateProvider for XmlProvider {
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
        let healthy = self.transport.health().await;
        Ok(if healthy {
            ProviderHealth::healthy_with_latency(
                self.provider_id.clone(),
                elapsed_ms(started.elapsed()),
            )
        } else {
            ProviderHealth::unhealthy(self.provider_id.clone(), "upstream health probe failed")
        })
    }
}

/// Upstream simulator for the XML provider.
#[derive(Debug, Clone)]
pub struct XmlUpstream {
    desk: SimulatedDesk,
}

impl XmlUpstream {
    /// Creates an upstream around a desk.
    #[must_use]
    pub fn new(desk: SimulatedDesk) -> Self {
        Self { desk }
    }

    fn fault(status: StatusCode, error: impl Into<String>) -> WireReply {
        let document = XmlFault {
            error: error.into(),
        };
        WireReply::new(
            status.as_u16(),
            WireFormat::Xml,
            quick_xml::se::to_string(&document).unwrap_or_default(),
        )
    }
}

#[async_trait]
impl UpstreamService for XmlUpstream {
    fn provider_id(&self) -> &ProviderId {
        self.desk.provider_id()
    }

    fn format(&self) -> WireFormat {
        WireFormat::Xml
    }

    async fn handle(&self, request: WireRequest) -> WireReply {
        let parsed: XmlRequest = match quick_xml::de::from_str(&request.body) {
            Ok(parsed) => parsed,
            Err(e) => return Self::fault(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        };
        if parsed.amount <= Decimal::ZERO {
            return Self::fault(StatusCode::UNPROCESSABLE_ENTITY, "Amount must be positive");
        }
        debug!(
            provider = %self.desk.provider_id(),
            from = %parsed.from,
            to = %parsed.to,
            amount = %parsed.amount,
            "xml request received"
        );

        let rate = match self.desk.quote_codes(&parsed.from, &parsed.to).await {
            Ok(rate) => rate,
            Err(rejection @ DeskRejection::TransientFailure(_)) => {
                warn!(provider = %self.desk.provider_id(), "{rejection}");
                return Self::fault(StatusCode::SERVICE_UNAVAILABLE, rejection.to_string());
            }
            Err(rejection) => {
                warn!(provider = %self.desk.provider_id(), "{rejection}");
                return Self::fault(StatusCode::BAD_REQUEST, rejection.to_string());
            }
        };

        let result = match rate.safe_mul(parsed.amount) {
            Ok(result) => result,
            Err(e) => return Self::fault(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        };
        let document = XmlResponse {
            result: Some(result.round_dp(RESULT_SCALE)),
        };
        match quick_xml::se::to_string(&document) {
            Ok(body) => WireReply::new(StatusCode::OK.as_u16(), WireFormat::Xml, body),
            Err(e) => Self::fault(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
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

    fn upstream(simulation: FixedSimulation, failure_probability: f64) -> Arc<XmlUpstream> {
        Arc::new(XmlUpstream::new(SimulatedDesk::new(
            ProviderId::new("API2"),
            RateTable::xml_defaults().unwrap(),
            SimulationProfile::new(0, 0, 0.015, failure_probability),
            Arc::new(simulation),
        )))
    }

    fn provider(upstream: Arc<XmlUpstream>) -> XmlProvider {
        XmlProvider::new(
            ProviderId::new("API2"),
            1000,
            Arc::new(InProcessTransport::new(upstream)),
        )
    }

    fn request(source: &str, target: &str) -> RateRequest {
        RateRequest::new(source, target, Decimal::new(10000, 2)).unwrap()
    }

    #[test]
    fn encodes_xml_document() {
        let wire = XmlProvider::encode(&request("USD", "EUR")).unwrap();
        assert_eq!(wire.format, WireFormat::Xml);
        assert_eq!(
            wire.body,
            "<XML><From>USD</From><To>EUR</To><Amount>100.00</Amount></XML>"
        );
    }

    #[test]
    fn decodes_result_and_missing_result() {
        let adapter = provider(upstream(FixedSimulation::default(), 0.0));
        assert_eq!(
            adapter.decode("<XML><Result>87.50</Result></XML>").unwrap(),
            Some(Decimal::new(8750, 2))
        );
        assert_eq!(adapter.decode("<XML></XML>").unwrap(), None);
        assert!(adapter.decode("<XML><Result>abc</Result></XML>").is_err());
    }

    #[tokio::test]
    async fn result_is_the_converted_amount() {
        let offer = provider(upstream(FixedSimulation::default(), 0.0))
            .request_offer(&request("USD", "EUR"))
            .await
            .unwrap();
        assert_eq!(offer.converted_amount(), Decimal::new(86, 0));
        assert_eq!(offer.rate(), Decimal::new(86, 2));
    }

    #[tokio::test]
    async fn unsupported_pair_is_a_rejection() {
        let error = provider(upstream(FixedSimulation::default(), 0.0))
            .request_offer(&request("AED", "QAR"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::UnsupportedPair);
    }

    #[tokio::test]
    async fn outage_is_unavailable() {
        let error = provider(upstream(FixedSimulation::failing(), 1.0))
            .request_offer(&request("USD", "EUR"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::Unavailable);
    }

    #[tokio::test]
    async fn malformed_document_is_unprocessable() {
        let reply = upstream(FixedSimulation::default(), 0.0)
            .handle(WireRequest::xml("<XML><From>USD</From></XML>"))
            .await;
        assert_eq!(reply.status, 422);
        assert!(reply.body.contains("<Error>"));
    }
}

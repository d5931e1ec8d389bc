//! # REST Errors
//!
//! Maps application failures onto HTTP responses.
//!
//! Every error body has the same shape:
//!
//! ```json
//! {
//!   "status_code": 400,
//!   "message": "invalid Source currency 'XXX'",
//!   "data": { "error": "Validation Error", "supported_currencies": ["AED", "..."] }
//! }
//! ```

use crate::application::error::ApplicationError;
use crate::application::services::AggregationError;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::CurrencyCode;
use crate::infrastructure::providers::error::FailureKind;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Error returned by REST handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Application failure.
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// The body could not be parsed.
    #[error("{0}")]
    MalformedBody(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Application(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

/// Result type for REST handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    status_code: u16,
    message: String,
    data: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    supported_currencies: Option<Vec<&'static str>>,
}

impl ApiError {
    fn classify(&self) -> (StatusCode, &'static str, bool) {
        match self {
            Self::MalformedBody(_) => (StatusCode::BAD_REQUEST, "Validation Error", true),
            Self::Application(err) => match err {
                ApplicationError::Validation(e) if e.is_request_validation() => {
                    (StatusCode::BAD_REQUEST, "Validation Error", true)
                }
                ApplicationError::Aggregation(AggregationError::NoOffersAvailable { .. }) => {
                    (StatusCode::BAD_REQUEST, "No Offers Available", true)
                }
                ApplicationError::Provider(e) => match e.kind() {
                    FailureKind::UnsupportedPair => {
                        (StatusCode::BAD_REQUEST, "Unsupported Currency Pair", false)
                    }
                    FailureKind::Unavailable => {
                        (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", false)
                    }
                },
                ApplicationError::ProviderNotFound(_) => {
                    (StatusCode::NOT_FOUND, "Provider Not Found", false)
                }
                ApplicationError::Timeout(_) => {
                    (StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout", false)
                }
                ApplicationError::Validation(_)
                | ApplicationError::Aggregation(_)
                | ApplicationError::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    false,
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, with_currencies) = self.classify();
        let message = self.to_string();
        let retryable = matches!(&self, Self::Application(err) if err.is_retryable());
        if status.is_server_error() {
            error!(status = status.as_u16(), retryable, error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), retryable, error = %message, "request rejected");
        }

        let body = Json(ErrorBody {
            status_code: status.as_u16(),
            message,
            data: ErrorDetail {
                error: label,
                supported_currencies: with_currencies.then(CurrencyCode::supported),
            },
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::error::ProviderError;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_supported_currencies() {
        let (status, body) = render(DomainError::NonPositiveAmount.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status_code"], 400);
        assert_eq!(body["message"], "amount must be greater than 0");
        assert_eq!(body["data"]["error"], "Validation Error");
        assert_eq!(body["data"]["supported_currencies"].as_array().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn no_offers_is_bad_request() {
        let err: ApplicationError = AggregationError::NoOffersAvailable {
            pair: "AED/QAR".to_string(),
            queried: 3,
            unsupported: 3,
            unavailable: 0,
        }
        .into();
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("AED/QAR"));
    }

    #[tokio::test]
    async fn provider_failures_map_by_kind() {
        let unsupported: ApplicationError = ProviderError::unsupported_pair("no").into();
        let (status, body) = render(unsupported.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["data"].get("supported_currencies").is_none());

        let unavailable: ApplicationError = ProviderError::connection("refused").into();
        let (status, _) = render(unavailable.into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn remaining_statuses() {
        let (status, _) = render(ApplicationError::provider_not_found("API9").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = render(ApplicationError::Timeout(10).into()).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

        let (status, body) = render(ApplicationError::internal("boom").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["data"]["error"], "Internal Server Error");

        let invalid: ApplicationError = DomainError::invalid_offer("zero").into();
        let (status, _) = render(invalid.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

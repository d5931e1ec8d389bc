//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(DomainError)          - Request rejected at the boundary
//! ├── Provider(ProviderError)          - A single-provider quote failed
//! ├── Aggregation(AggregationError)    - No provider produced an offer
//! ├── ProviderNotFound(String)         - Unknown provider name
//! ├── Timeout(u64)                     - Caller-side deadline exceeded
//! └── Internal(String)                 - Everything else
//! ```
//!
//! # Examples
//!
//! ```
//! use rate_compare::application::error::ApplicationError;
//! use rate_compare::domain::DomainError;
//!
//! let err: ApplicationError = DomainError::NonPositiveAmount.into();
//! assert!(err.is_validation());
//!
//! let err = ApplicationError::provider_not_found("API9");
//! assert!(err.is_not_found());
//! ```

use crate::application::services::rate_aggregation::AggregationError;
use crate::domain::errors::DomainError;
use crate::infrastructure::providers::error::{FailureKind, ProviderError};
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Clone, Error)]
pub enum ApplicationError {
    /// The request failed boundary validation.
    #[error("{0}")]
    Validation(#[from] DomainError),

    /// A single-provider quote failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Aggregation produced no offer.
    #[error("{0}")]
    Aggregation(#[from] AggregationError),

    /// Provider not found.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// The caller-side deadline elapsed.
    #[error("comparison timed out after {0}ms")]
    Timeout(u64),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a provider not found error.
    #[must_use]
    pub fn provider_not_found(provider: impl Into<String>) -> Self {
        Self::ProviderNotFound(provider.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if the request itself was rejected.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(e) if e.is_request_validation())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProviderNotFound(_))
    }

    /// Returns true if a provider rejected the pair.
    #[must_use]
    pub fn is_unsupported_pair(&self) -> bool {
        matches!(self, Self::Provider(e) if e.kind() == FailureKind::UnsupportedPair)
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_wraps_domain_message() {
        let err: ApplicationError = DomainError::AmountTooLarge.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "amount cannot exceed 1,000,000");
    }

    #[test]
    fn invalid_offer_is_not_request_validation() {
        let err: ApplicationError = DomainError::invalid_offer("zero").into();
        assert!(!err.is_validation());
    }

    #[test]
    fn provider_classification() {
        let err: ApplicationError = ProviderError::unsupported_pair("AED/QAR").into();
        assert!(err.is_unsupported_pair());
        assert!(!err.is_retryable());

        let err: ApplicationError = ProviderError::transient("blip").into();
        assert!(!err.is_unsupported_pair());
        assert!(err.is_retryable());
    }

    #[test]
    fn aggregation_message_is_passed_through() {
        let err: ApplicationError = AggregationError::NoOffersAvailable {
            pair: "AED/QAR".to_string(),
            queried: 3,
            unsupported: 3,
            unavailable: 0,
        }
        .into();
        assert!(err.to_string().contains("AED/QAR"));
    }

    #[test]
    fn timeout_display() {
        assert_eq!(
            ApplicationError::Timeout(15_000).to_string(),
            "comparison timed out after 15000ms"
        );
    }
}

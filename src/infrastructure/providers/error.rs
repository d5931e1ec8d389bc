//! # Provider Errors
//!
//! Error types for rate provider adapters.
//!
//! Every error is classified into a [`FailureKind`]: either the provider
//! explicitly has no rate for the pair, or it could not produce one.
//!
//! # Examples
//!
//! ```
//! use rate_compare::infrastructure::providers::error::{FailureKind, ProviderError};
//!
//! let error = ProviderError::unsupported_pair("AED/QAR is not supported by API2");
//! assert_eq!(error.kind(), FailureKind::UnsupportedPair);
//!
//! let error = ProviderError::timeout_with_duration("no reply", 10_000);
//! assert_eq!(error.kind(), FailureKind::Unavailable);
//! assert!(error.is_retryable());
//! ```

use crate::domain::errors::DomainError;
use std::fmt;
use thiserror::Error;

/// How a provider failure is counted by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Business-level rejection: the provider has no rate for the pair.
    UnsupportedPair,
    /// Transport, timeout, malformed or empty reply, transient failure.
    Unavailable,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedPair => write!(f, "UNSUPPORTED_PAIR"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

/// Error type for provider adapter operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider has no rate for the requested pair.
    #[error("provider unsupported pair: {message}")]
    UnsupportedPair {
        /// Error message.
        message: String,
    },

    /// Request timed out.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// Network or connection error, including upstream 5xx replies.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// The reply did not have the expected shape.
    #[error("provider protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// The reply parsed but carried no figure.
    #[error("provider returned no result: {message}")]
    EmptyResponse {
        /// Error message.
        message: String,
    },

    /// Simulated transient outage.
    #[error("provider transient failure: {message}")]
    TransientFailure {
        /// Error message.
        message: String,
    },

    /// The provider's figure violates the offer invariants.
    #[error("provider invalid offer: {0}")]
    InvalidOffer(#[from] DomainError),

    /// Internal adapter error.
    #[error("provider internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates an unsupported pair error.
    #[must_use]
    pub fn unsupported_pair(message: impl Into<String>) -> Self {
        Self::UnsupportedPair {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an empty response error.
    #[must_use]
    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::EmptyResponse {
            message: message.into(),
        }
    }

    /// Creates a transient failure error.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientFailure {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classifies this error for failure accounting.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnsupportedPair { .. } => FailureKind::UnsupportedPair,
            _ => FailureKind::Unavailable,
        }
    }

    /// Returns true if the provider rejected the pair.
    #[must_use]
    pub fn is_unsupported_pair(&self) -> bool {
        self.kind() == FailureKind::UnsupportedPair
    }

    /// Returns true if this error is transient and may succeed on retry.
    ///
    /// Nothing in the aggregator retries; the flag is surfaced in logs.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::TransientFailure { .. }
        )
    }

    /// Returns the timeout in milliseconds, if this is a timeout.
    #[must_use]
    pub fn timeout_ms(&self) -> Option<u64> {
        match self {
            Self::Timeout { timeout_ms, .. } => *timeout_ms,
            _ => None,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

//! # Domain Errors
//!
//! Validation and invariant failures raised while constructing domain values.
//!
//! Every variant here is a boundary-side rejection: a [`RateRequest`] that
//! fails any of these checks is never constructed and therefore never reaches
//! the aggregation engine.
//!
//! [`RateRequest`]: crate::domain::entities::RateRequest

use crate::domain::value_objects::arithmetic::ArithmeticError;
use std::fmt;
use thiserror::Error;

/// Which side of a conversion a currency field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyField {
    /// The currency being converted from.
    Source,
    /// The currency being converted to.
    Target,
}

impl fmt::Display for CurrencyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "Source"),
            Self::Target => write!(f, "Target"),
        }
    }
}

/// Error type for domain validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A currency code was empty or whitespace.
    #[error("{0} currency is required")]
    MissingCurrency(CurrencyField),

    /// A currency code was not three ASCII letters.
    #[error("{field} currency must be exactly 3 letters (e.g. USD, EUR, GBP), got '{value}'")]
    InvalidCurrencyFormat {
        /// The offending field.
        field: CurrencyField,
        /// The raw value after trimming.
        value: String,
    },

    /// A well-formed code outside the supported allow-list.
    #[error("invalid {field} currency '{code}'")]
    UnsupportedCurrency {
        /// The offending field.
        field: CurrencyField,
        /// The normalized code.
        code: String,
    },

    /// Source and target currencies are identical.
    #[error("source and target currencies cannot be the same ({0})")]
    SameCurrency(String),

    /// Amount is zero or negative.
    #[error("amount must be greater than 0")]
    NonPositiveAmount,

    /// Amount exceeds the per-request ceiling.
    #[error("amount cannot exceed 1,000,000")]
    AmountTooLarge,

    /// Amount carries more than two fractional digits.
    #[error("amount cannot have more than 2 decimal places")]
    TooManyDecimalPlaces,

    /// A provider figure violates the offer invariants.
    #[error("invalid offer: {0}")]
    InvalidOffer(String),

    /// Checked arithmetic failed while deriving a figure.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl DomainError {
    /// Creates an invalid offer error.
    #[must_use]
    pub fn invalid_offer(message: impl Into<String>) -> Self {
        Self::InvalidOffer(message.into())
    }

    /// Returns true if this error came from request validation.
    ///
    /// Offer and arithmetic failures are raised on the provider side and
    /// are not the caller's fault.
    #[must_use]
    pub fn is_request_validation(&self) -> bool {
        !matches!(self, Self::InvalidOffer(_) | Self::Arithmetic(_))
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

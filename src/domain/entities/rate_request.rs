//! # Rate Request
//!
//! The validated, currency-normalized conversion request handed to the
//! aggregation engine.
//!
//! # Examples
//!
//! ```
//! use rate_compare::domain::entities::RateRequest;
//! use rust_decimal::Decimal;
//!
//! let request = RateRequest::new("usd", "EUR", Decimal::new(10000, 2)).unwrap();
//! assert_eq!(request.pair(), "USD/EUR");
//!
//! assert!(RateRequest::new("USD", "usd", Decimal::ONE).is_err());
//! ```

use crate::domain::errors::{CurrencyField, DomainError, DomainResult};
use crate::domain::value_objects::{Amount, CurrencyCode};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A conversion request that passed boundary validation.
///
/// # Invariants
///
/// - both currencies are in the supported allow-list
/// - `source_currency != target_currency`
/// - the amount satisfies [`Amount`]'s rules
///
/// Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RateRequest {
    source_currency: CurrencyCode,
    target_currency: CurrencyCode,
    amount: Amount,
}

impl RateRequest {
    /// Validates raw input and builds a request.
    ///
    /// Currencies are checked before the amount, source before target.
    ///
    /// # Errors
    ///
    /// Returns the first [`DomainError`] encountered.
    pub fn new(source: &str, target: &str, amount: Decimal) -> DomainResult<Self> {
        let source_currency = CurrencyCode::parse(source, CurrencyField::Source)?;
        let target_currency = CurrencyCode::parse(target, CurrencyField::Target)?;
        let amount = Amount::new(amount)?;
        Self::from_parts(source_currency, target_currency, amount)
    }

    /// Builds a request from already validated parts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SameCurrency` if both currencies are equal.
    pub fn from_parts(
        source_currency: CurrencyCode,
        target_currency: CurrencyCode,
        amount: Amount,
    ) -> DomainResult<Self> {
        if source_currency == target_currency {
            return Err(DomainError::SameCurrency(source_currency.to_string()));
        }
        Ok(Self {
            source_currency,
            target_currency,
            amount,
        })
    }

    /// Returns the source currency.
    #[inline]
    #[must_use]
    pub fn source_currency(&self) -> CurrencyCode {
        self.source_currency
    }

    /// Returns the target currency.
    #[inline]
    #[must_use]
    pub fn target_currency(&self) -> CurrencyCode {
        self.target_currency
    }

    /// Returns the validated amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Returns the pair as `SRC/DST`, used in logs and diagnostics.
    #[must_use]
    pub fn pair(&self) -> String {
        format!("{}/{}", self.source_currency, self.target_currency)
    }
}

impl fmt::Display for RateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.amount, self.source_currency, self.target_currency
        )
    }
}

//! # Amount
//!
//! The monetary amount a caller wants converted.

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Largest amount accepted in a single request.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum number of fractional digits an amount may carry.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// A validated conversion amount.
///
/// # Invariants
///
/// - strictly positive
/// - at most [`MAX_AMOUNT`]
/// - at most [`MAX_AMOUNT_SCALE`] fractional digits, counted on the value as
///   given (`100.000` is rejected even though it equals `100`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// Validates a raw decimal amount.
    ///
    /// # Errors
    ///
    /// - `DomainError::NonPositiveAmount` for zero or negative values.
    /// - `DomainError::AmountTooLarge` above [`MAX_AMOUNT`].
    /// - `DomainError::TooManyDecimalPlaces` when the scale exceeds 2.
    ///
    /// # Examples
    ///
    /// ```
    /// use rate_compare::domain::value_objects::Amount;
    /// use rust_decimal::Decimal;
    ///
    /// assert!(Amount::new(Decimal::new(10000, 2)).is_ok());
    /// assert!(Amount::new(Decimal::new(100005, 3)).is_err());
    /// ```
    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount);
        }
        if value > MAX_AMOUNT {
            return Err(DomainError::AmountTooLarge);
        }
        if value.scale() > MAX_AMOUNT_SCALE {
            return Err(DomainError::TooManyDecimalPlaces);
        }
        Ok(Self(value))
    }

    /// Returns the underlying decimal.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.0, serializer)
    }
}

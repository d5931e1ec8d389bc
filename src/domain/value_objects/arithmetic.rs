//! # Checked Arithmetic
//!
//! Overflow-safe decimal operations used when deriving converted amounts and
//! effective rates from provider figures.
//!
//! # Examples
//!
//! ```
//! use rate_compare::domain::value_objects::arithmetic::{ArithmeticError, CheckedArithmetic};
//! use rust_decimal::Decimal;
//!
//! let converted = Decimal::new(8750, 2);
//! let amount = Decimal::new(10000, 2);
//! assert_eq!(converted.safe_div(amount).unwrap(), Decimal::new(875, 3));
//! assert_eq!(converted.safe_div(Decimal::ZERO), Err(ArithmeticError::DivisionByZero));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Number of fractional digits kept on an effective rate.
///
/// At the maximum request amount of 1,000,000 the rounding error of a
/// 10-digit rate stays below 0.0001, well inside the offer tolerance.
pub const RATE_SCALE: u32 = 10;

/// Error type for arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Arithmetic operation resulted in overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero attempted.
    #[error("division by zero")]
    DivisionByZero,
}

/// Result type for arithmetic operations.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Trait for checked arithmetic operations.
///
/// Returns `Result` instead of panicking on overflow or division by zero.
pub trait CheckedArithmetic: Sized {
    /// Safely multiply two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely divide two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::DivisionByZero` if the divisor is zero.
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self>;
}

impl CheckedArithmetic for Decimal {
    #[inline]
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_mul(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        self.checked_div(rhs).ok_or(ArithmeticError::Overflow)
    }
}

/// Derives the effective rate `converted / amount`, rounded to [`RATE_SCALE`].
///
/// # Errors
///
/// Returns `ArithmeticError::DivisionByZero` if `amount` is zero.
pub fn effective_rate(converted: Decimal, amount: Decimal) -> ArithmeticResult<Decimal> {
    Ok(converted.safe_div(amount)?.round_dp(RATE_SCALE).normalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_formats_correctly() {
        assert_eq!(ArithmeticError::Overflow.to_string(), "arithmetic overflow");
        assert_eq!(
            ArithmeticError::DivisionByZero.to_string(),
            "division by zero"
        );
    }

    #[test]
    fn safe_mul_overflow_fails() {
        assert_eq!(
            Decimal::MAX.safe_mul(Decimal::TWO),
            Err(ArithmeticError::Overflow)
        );
    }

    #[test]
    fn effective_rate_is_converted_over_amount() {
        let rate = effective_rate(
            Decimal::from_str("87.50").unwrap(),
            Decimal::from_str("100.00").unwrap(),
        )
        .unwrap();
        assert_eq!(rate, Decimal::from_str("0.875").unwrap());
    }

    #[test]
    fn effective_rate_keeps_offer_tolerance_at_max_amount() {
        let amount = Decimal::from(1_000_000);
        let converted = Decimal::from_str("853421.77").unwrap();
        let rate = effective_rate(converted, amount).unwrap();
        let drift = (converted - rate * amount).abs();
        assert!(drift < Decimal::from_str("0.01").unwrap());
    }

    #[test]
    fn effective_rate_rejects_zero_amount() {
        assert_eq!(
            effective_rate(Decimal::ONE, Decimal::ZERO),
            Err(ArithmeticError::DivisionByZero)
        );
    }
}

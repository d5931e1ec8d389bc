//! # Currency Codes
//!
//! ISO-4217-style currency codes restricted to a fixed allow-list.
//!
//! # Examples
//!
//! ```
//! use rate_compare::domain::errors::CurrencyField;
//! use rate_compare::domain::value_objects::CurrencyCode;
//!
//! let usd = CurrencyCode::parse(" usd ", CurrencyField::Source).unwrap();
//! assert_eq!(usd.as_str(), "USD");
//! assert!(CurrencyCode::parse("XYZ", CurrencyField::Source).is_err());
//! ```

use crate::domain::errors::{CurrencyField, DomainError, DomainResult};
use serde::{Serialize, Serializer};
use std::fmt;

/// Currencies accepted by the service, in alphabetical order.
pub const SUPPORTED_CURRENCIES: [&str; 30] = [
    "AED", "AUD", "BHD", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HUF",
    "ILS", "INR", "JPY", "KRW", "KWD", "MXN", "NOK", "NZD", "PLN", "QAR", "RUB", "SAR", "SEK",
    "SGD", "TRY", "USD", "ZAR",
];

/// A validated, uppercase currency code from [`SUPPORTED_CURRENCIES`].
///
/// The code borrows its text from the allow-list, so it is `Copy` and
/// comparisons are plain string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(&'static str);

impl CurrencyCode {
    /// Parses and normalizes a raw currency code.
    ///
    /// Input is trimmed and uppercased before validation, so normalizing an
    /// already valid code returns the same code.
    ///
    /// # Errors
    ///
    /// - `DomainError::MissingCurrency` if the input is blank.
    /// - `DomainError::InvalidCurrencyFormat` if it is not three letters.
    /// - `DomainError::UnsupportedCurrency` if it is not in the allow-list.
    pub fn parse(raw: &str, field: CurrencyField) -> DomainResult<Self> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(DomainError::MissingCurrency(field));
        }

        if normalized.len() != 3 || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrencyFormat {
                field,
                value: normalized,
            });
        }

        SUPPORTED_CURRENCIES
            .iter()
            .copied()
            .find(|code| *code == normalized.as_str())
            .map(Self)
            .ok_or(DomainError::UnsupportedCurrency {
                field,
                code: normalized,
            })
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Returns every supported code, sorted.
    #[must_use]
    pub fn supported() -> Vec<&'static str> {
        SUPPORTED_CURRENCIES.to_vec()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for CurrencyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let code = CurrencyCode::parse("  eur", CurrencyField::Target).unwrap();
        assert_eq!(code.as_str(), "EUR");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(
            CurrencyCode::parse("   ", CurrencyField::Source),
            Err(DomainError::MissingCurrency(CurrencyField::Source))
        );
    }

    #[test]
    fn parse_rejects_wrong_length_and_digits() {
        assert!(matches!(
            CurrencyCode::parse("US", CurrencyField::Source),
            Err(DomainError::InvalidCurrencyFormat { .. })
        ));
        assert!(matches!(
            CurrencyCode::parse("US1", CurrencyField::Source),
            Err(DomainError::InvalidCurrencyFormat { .. })
        ));
    }

    #[test]
    fn parse_rejects_unknown_code() {
        assert!(matches!(
            CurrencyCode::parse("XYZ", CurrencyField::Target),
            Err(DomainError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn allow_list_is_sorted_and_unique() {
        let mut sorted = SUPPORTED_CURRENCIES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, SUPPORTED_CURRENCIES.to_vec());
    }

    #[test]
    fn serializes_as_plain_string() {
        let code = CurrencyCode::parse("GBP", CurrencyField::Source).unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"GBP\"");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(index in 0usize..SUPPORTED_CURRENCIES.len()) {
            let raw = SUPPORTED_CURRENCIES.get(index).copied().unwrap_or("USD");
            let once = CurrencyCode::parse(raw, CurrencyField::Source).unwrap();
            let twice = CurrencyCode::parse(once.as_str(), CurrencyField::Source).unwrap();
            prop_assert_eq!(once, twice);
            prop_assert_eq!(once.as_str(), raw);
        }

        #[test]
        fn lowercase_input_resolves_to_same_code(index in 0usize..SUPPORTED_CURRENCIES.len()) {
            let raw = SUPPORTED_CURRENCIES.get(index).copied().unwrap_or("USD");
            let lower = CurrencyCode::parse(&raw.to_ascii_lowercase(), CurrencyField::Target).unwrap();
            prop_assert_eq!(lower.as_str(), raw);
        }
    }
}

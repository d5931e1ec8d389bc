//! Base rate tables owned by the upstream simulators.

use crate::domain::errors::{CurrencyField, DomainResult};
use crate::domain::value_objects::CurrencyCode;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Read-only map from a currency pair to its base rate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: HashMap<(CurrencyCode, CurrencyCode), Decimal>,
}

impl RateTable {
    /// Builds a table from `(source, target, rate)` entries.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if a code is not in the allow-list.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str, Decimal)>,
    ) -> DomainResult<Self> {
        let mut rates = HashMap::new();
        for (source, target, rate) in entries {
            let source = CurrencyCode::parse(source, CurrencyField::Source)?;
            let target = CurrencyCode::parse(target, CurrencyField::Target)?;
            rates.insert((source, target), rate);
        }
        Ok(Self { rates })
    }

    /// Returns the base rate for a pair, if quoted.
    #[must_use]
    pub fn lookup(&self, source: CurrencyCode, target: CurrencyCode) -> Option<Decimal> {
        self.rates.get(&(source, target)).copied()
    }

    /// Returns the number of quoted pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if no pair is quoted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Book of the flat JSON desk.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in entries.
    pub fn flat_json_defaults() -> DomainResult<Self> {
        Self::from_entries([
            ("USD", "EUR", Decimal::new(85, 2)),
            ("USD", "GBP", Decimal::new(73, 2)),
            ("USD", "JPY", Decimal::new(110, 0)),
            ("EUR", "USD", Decimal::new(118, 2)),
            ("EUR", "GBP", Decimal::new(86, 2)),
            ("GBP", "USD", Decimal::new(137, 2)),
            ("GBP", "EUR", Decimal::new(116, 2)),
            ("JPY", "USD", Decimal::new(91, 4)),
            ("USD", "CHF", Decimal::new(92, 2)),
            ("USD", "CAD", Decimal::new(125, 2)),
        ])
    }

    /// Book of the XML desk.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in entries.
    pub fn xml_defaults() -> DomainResult<Self> {
        Self::from_entries([
            ("USD", "EUR", Decimal::new(86, 2)),
            ("USD", "GBP", Decimal::new(74, 2)),
            ("USD", "JPY", Decimal::new(111, 0)),
            ("EUR", "USD", Decimal::new(116, 2)),
            ("EUR", "GBP", Decimal::new(87, 2)),
            ("GBP", "USD", Decimal::new(135, 2)),
            ("GBP", "EUR", Decimal::new(115, 2)),
            ("JPY", "USD", Decimal::new(9, 3)),
        ])
    }

    /// Book of the nested JSON desk.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in entries.
    pub fn nested_json_defaults() -> DomainResult<Self> {
        Self::from_entries([
            ("USD", "EUR", Decimal::new(865, 3)),
            ("USD", "GBP", Decimal::new(735, 3)),
            ("USD", "JPY", Decimal::new(1105, 1)),
            ("EUR", "USD", Decimal::new(117, 2)),
            ("EUR", "GBP", Decimal::new(865, 3)),
            ("GBP", "USD", Decimal::new(136, 2)),
            ("GBP", "EUR", Decimal::new(1155, 3)),
            ("JPY", "USD", Decimal::new(905, 5)),
            ("USD", "AUD", Decimal::new(135, 2)),
            ("AUD", "USD", Decimal::new(74, 2)),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::parse(raw, CurrencyField::Source).unwrap()
    }

    #[test]
    fn books_differ_between_desks() {
        let flat = RateTable::flat_json_defaults().unwrap();
        let xml = RateTable::xml_defaults().unwrap();
        let nested = RateTable::nested_json_defaults().unwrap();

        let usd_eur = |table: &RateTable| table.lookup(code("USD"), code("EUR"));
        assert_eq!(usd_eur(&flat), Some(Decimal::new(85, 2)));
        assert_eq!(usd_eur(&xml), Some(Decimal::new(86, 2)));
        assert_eq!(usd_eur(&nested), Some(Decimal::new(865, 3)));
        assert_eq!(xml.len(), 8);
    }

    #[test]
    fn lookup_is_directional() {
        let nested = RateTable::nested_json_defaults().unwrap();
        assert!(nested.lookup(code("USD"), code("AUD")).is_some());
        assert!(nested.lookup(code("AUD"), code("EUR")).is_none());
    }

    #[test]
    fn no_desk_quotes_aed_qar() {
        for table in [
            RateTable::flat_json_defaults().unwrap(),
            RateTable::xml_defaults().unwrap(),
            RateTable::nested_json_defaults().unwrap(),
        ] {
            assert!(table.lookup(code("AED"), code("QAR")).is_none());
        }
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(RateTable::from_entries([("USD", "XXX", Decimal::ONE)]).is_err());
        assert!(RateTable::default().is_empty());
    }
}

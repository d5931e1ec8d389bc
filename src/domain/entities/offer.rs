//! # Offer Entity
//!
//! One provider's canonical quote for a conversion request.
//!
//! # Examples
//!
//! ```
//! use rate_compare::domain::entities::{Offer, RateRequest};
//! use rate_compare::domain::value_objects::ProviderId;
//! use rust_decimal::Decimal;
//! use std::time::Duration;
//!
//! let request = RateRequest::new("USD", "EUR", Decimal::new(10000, 2)).unwrap();
//! let offer = Offer::new(
//!     ProviderId::new("API2"),
//!     &request,
//!     Decimal::new(8750, 2),
//!     Duration::from_millis(134),
//! )
//! .unwrap();
//!
//! assert_eq!(offer.rate(), Decimal::new(875, 3));
//! assert_eq!(offer.response_time_ms(), 134);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::entities::RateRequest;
use crate::domain::value_objects::arithmetic::effective_rate;
use crate::domain::value_objects::{Amount, CurrencyCode, ProviderId};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Converts an elapsed duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// A canonical quote produced by a successful provider call.
///
/// # Invariants
///
/// - `converted_amount > 0` and `rate > 0`
/// - `rate = converted_amount / amount`, kept at 10 fractional digits
/// - currencies and amount are echoed from the request, never taken from
///   the provider's own figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offer {
    provider: ProviderId,
    source_currency: CurrencyCode,
    target_currency: CurrencyCode,
    amount: Amount,
    converted_amount: Decimal,
    rate: Decimal,
    response_time_ms: u64,
}

impl Offer {
    /// Builds an offer from a provider's converted amount.
    ///
    /// # Arguments
    ///
    /// * `provider` - The provider that produced the figure
    /// * `request` - The request being answered; its fields are echoed
    /// * `converted_amount` - Amount in the target currency
    /// * `response_time` - Wall-clock latency measured around the call
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidOffer` if the converted amount or the
    /// derived rate is not positive.
    pub fn new(
        provider: ProviderId,
        request: &RateRequest,
        converted_amount: Decimal,
        response_time: Duration,
    ) -> DomainResult<Self> {
        if converted_amount <= Decimal::ZERO {
            return Err(DomainError::invalid_offer(format!(
                "{provider} returned non-positive converted amount {converted_amount}"
            )));
        }

        let amount = request.amount();
        let rate = effective_rate(converted_amount, amount.get())?;
        if rate <= Decimal::ZERO {
            return Err(DomainError::invalid_offer(format!(
                "{provider} rate rounds to zero for {converted_amount}"
            )));
        }

        Ok(Self {
            provider,
            source_currency: request.source_currency(),
            target_currency: request.target_currency(),
            amount,
            converted_amount,
            rate,
            response_time_ms: elapsed_ms(response_time),
        })
    }

    /// Returns the provider ID.
    #[inline]
    #[must_use]
    pub fn provider(&self) -> &ProviderId {
        &self.provider
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

    /// Returns the requested amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Returns the converted amount in the target currency.
    #[inline]
    #[must_use]
    pub fn converted_amount(&self) -> Decimal {
        self.converted_amount
    }

    /// Returns the effective rate.
    #[inline]
    #[must_use]
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Returns the measured provider latency in milliseconds.
    #[inline]
    #[must_use]
    pub fn response_time_ms(&self) -> u64 {
        self.response_time_ms
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Offer({} {} -> {} {} @ {} from {})",
            self.amount,
            self.source_currency,
            self.converted_amount,
            self.target_currency,
            self.rate,
            self.provider
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn request(amount: &str) -> RateRequest {
        RateRequest::new("USD", "EUR", dec(amount)).unwrap()
    }

    #[test]
    fn elapsed_ms_saturates() {
        assert_eq!(elapsed_ms(Duration::from_millis(134)), 134);
        assert_eq!(elapsed_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn response_time_saturates_like_elapsed_ms() {
        let offer = Offer::new(
            ProviderId::new("API1"),
            &request("1"),
            dec("0.85"),
            Duration::MAX,
        )
        .unwrap();
        assert_eq!(offer.response_time_ms(), u64::MAX);
    }

    #[test]
    fn echoes_request_fields() {
        let request = request("100.00");
        let offer = Offer::new(
            ProviderId::new("API1"),
            &request,
            dec("85.00"),
            Duration::from_millis(12),
        )
        .unwrap();

        assert_eq!(offer.source_currency(), request.source_currency());
        assert_eq!(offer.target_currency(), request.target_currency());
        assert_eq!(offer.amount(), request.amount());
        assert_eq!(offer.rate(), dec("0.85"));
    }

    #[test]
    fn rejects_zero_and_negative_conversions() {
        let request = request("10");
        for figure in ["0", "-1.5"] {
            let result = Offer::new(
                ProviderId::new("API1"),
                &request,
                dec(figure),
                Duration::ZERO,
            );
            assert!(matches!(result, Err(DomainError::InvalidOffer(_))));
        }
    }

    #[test]
    fn serializes_canonical_shape() {
        let offer = Offer::new(
            ProviderId::new("API2"),
            &request("100.00"),
            dec("87.50"),
            Duration::from_millis(134),
        )
        .unwrap();

        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["provider"], "API2");
        assert_eq!(json["source_currency"], "USD");
        assert_eq!(json["target_currency"], "EUR");
        assert_eq!(json["amount"], "100.00");
        assert_eq!(json["converted_amount"], "87.50");
        assert_eq!(json["rate"], "0.875");
        assert_eq!(json["response_time_ms"], 134);
    }

    proptest! {
        #[test]
        fn converted_matches_rate_times_amount(
            cents in 1i64..=100_000_000i64,
            rate_millionths in 1i64..=200_000_000i64,
        ) {
            let request = RateRequest::new("USD", "JPY", Decimal::new(cents, 2)).unwrap();
            let converted = (Decimal::new(cents, 2) * Decimal::new(rate_millionths, 6)).round_dp(2);
            prop_assume!(converted > Decimal::ZERO);

            let offer = Offer::new(ProviderId::new("P"), &request, converted, Duration::ZERO).unwrap();
            let drift = (offer.converted_amount() - offer.rate() * offer.amount().get()).abs();
            prop_assert!(drift < Decimal::new(1, 2));
        }
    }
}

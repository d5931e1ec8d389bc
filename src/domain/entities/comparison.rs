//! # Comparison Result
//!
//! Outcome of one aggregation run across every configured provider.

use crate::domain::entities::Offer;
use serde::Serialize;

/// The best offer together with every successful offer and failure counts.
///
/// # Invariants
///
/// - `successful_providers == all_offers.len()`
/// - `successful_providers + failed_providers == total_providers_queried`
/// - `best_offer` is one of `all_offers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    best_offer: Offer,
    all_offers: Vec<Offer>,
    total_providers_queried: usize,
    successful_providers: usize,
    failed_providers: usize,
}

impl ComparisonResult {
    /// Creates a comparison result.
    ///
    /// Returns `None` when `all_offers` is empty, when `best_offer` is not
    /// one of them, or when more offers than providers are reported.
    #[must_use]
    pub fn new(
        best_offer: Offer,
        all_offers: Vec<Offer>,
        total_providers_queried: usize,
    ) -> Option<Self> {
        let successful_providers = all_offers.len();
        let failed_providers = total_providers_queried.checked_sub(successful_providers)?;
        if !all_offers.contains(&best_offer) {
            return None;
        }

        Some(Self {
            best_offer,
            all_offers,
            total_providers_queried,
            successful_providers,
            failed_providers,
        })
    }

    /// Returns the offer with the highest converted amount.
    #[inline]
    #[must_use]
    pub fn best_offer(&self) -> &Offer {
        &self.best_offer
    }

    /// Returns every successful offer in completion order.
    #[inline]
    #[must_use]
    pub fn all_offers(&self) -> &[Offer] {
        &self.all_offers
    }

    /// Returns the number of providers queried.
    #[inline]
    #[must_use]
    pub fn total_providers_queried(&self) -> usize {
        self.total_providers_queried
    }

    /// Returns the number of providers that produced an offer.
    #[inline]
    #[must_use]
    pub fn successful_providers(&self) -> usize {
        self.successful_providers
    }

    /// Returns the number of providers that failed or rejected the pair.
    #[inline]
    #[must_use]
    pub fn failed_providers(&self) -> usize {
        self.failed_providers
    }
}

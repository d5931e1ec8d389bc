//! # Offer Selection
//!
//! Strategies for picking the winning offer.
//!
//! This module provides the [`SelectionStrategy`] trait and the
//! [`BestConvertedAmountStrategy`] the aggregation engine uses by default.

use crate::domain::entities::Offer;
use std::fmt;

/// Trait for selection strategies.
///
/// Implementations pick one offer out of the successful ones.
pub trait SelectionStrategy: Send + Sync + fmt::Debug {
    /// Returns the index of the winning offer, or `None` when `offers` is
    /// empty.
    fn select(&self, offers: &[Offer]) -> Option<usize>;

    /// Returns the name of this strategy.
    fn name(&self) -> &'static str;
}

/// Highest converted amount wins.
///
/// Strict max-scan in collection order: on a tie the offer encountered first
/// is kept. The amount is compared exactly, never via the rounded rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestConvertedAmountStrategy;

impl BestConvertedAmountStrategy {
    /// Creates a new strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SelectionStrategy for BestConvertedAmountStrategy {
    fn select(&self, offers: &[Offer]) -> Option<usize> {
        let mut best: Option<(usize, &Offer)> = None;
        for (index, offer) in offers.iter().enumerate() {
            match best {
                Some((_, current)) if offer.converted_amount() <= current.converted_amount() => {}
                _ => best = Some((index, offer)),
            }
        }
        best.map(|(index, _)| index)
    }

    fn name(&self) -> &'static str {
        "BestConvertedAmount"
    }
}

//! # Market Simulation
//!
//! Randomness behind the upstream simulators.
//!
//! Every upstream desk draws its latency, rate jitter and transient failures
//! from a [`MarketSimulation`]. Production wiring uses [`RandomSimulation`];
//! tests and benchmarks use [`FixedSimulation`] to get reproducible figures.
//!
//! # Examples
//!
//! ```
//! use rate_compare::infrastructure::providers::simulation::{
//!     FixedSimulation, MarketSimulation, SimulationProfile,
//! };
//! use std::time::Duration;
//!
//! let simulation = FixedSimulation::default();
//! let profile = SimulationProfile::new(100, 300, 0.02, 0.0);
//! assert_eq!(simulation.latency(&profile), Duration::ZERO);
//! assert_eq!(simulation.jitter_offset(profile.jitter()), 0.0);
//! ```

use crate::domain::errors::CurrencyField;
use crate::domain::value_objects::{CheckedArithmetic, CurrencyCode, ProviderId};
use crate::infrastructure::providers::rate_table::RateTable;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Fractional digits kept on a jittered rate.
pub const JITTERED_RATE_SCALE: u32 = 8;

/// Per-desk simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationProfile {
    latency_min_ms: u64,
    latency_max_ms: u64,
    jitter: f64,
    failure_probability: f64,
}

impl SimulationProfile {
    /// Creates a profile.
    ///
    /// `jitter` is the half-width of the uniform rate offset, e.g. `0.02`
    /// for ±2%.
    #[must_use]
    pub const fn new(
        latency_min_ms: u64,
        latency_max_ms: u64,
        jitter: f64,
        failure_probability: f64,
    ) -> Self {
        Self {
            latency_min_ms,
            latency_max_ms,
            jitter,
            failure_probability,
        }
    }

    /// Returns the lower latency bound in milliseconds.
    #[inline]
    #[must_use]
    pub fn latency_min_ms(&self) -> u64 {
        self.latency_min_ms
    }

    /// Returns the upper latency bound in milliseconds.
    #[inline]
    #[must_use]
    pub fn latency_max_ms(&self) -> u64 {
        self.latency_max_ms
    }

    /// Returns the jitter half-width.
    #[inline]
    #[must_use]
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Returns the probability of a transient failure per call.
    #[inline]
    #[must_use]
    pub fn failure_probability(&self) -> f64 {
        self.failure_probability
    }
}

/// Source of simulated latency, jitter and failures.
///
/// Implementations must not block; callers hold no lock across an await.
pub trait MarketSimulation: Send + Sync + fmt::Debug {
    /// Latency to wait before replying.
    fn latency(&self, profile: &SimulationProfile) -> Duration;

    /// Relative rate offset drawn from `[-amplitude, amplitude]`.
    fn jitter_offset(&self, amplitude: f64) -> f64;

    /// Whether this call fails transiently.
    fn should_fail(&self, probability: f64) -> bool;
}

/// Simulation backed by a seeded or entropy-seeded RNG.
#[derive(Debug)]
pub struct RandomSimulation {
    rng: Mutex<StdRng>,
}

impl RandomSimulation {
    /// Creates a simulation seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a reproducible simulation.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl MarketSimulation for RandomSimulation {
    fn latency(&self, profile: &SimulationProfile) -> Duration {
        let (min, max) = (profile.latency_min_ms, profile.latency_max_ms);
        if min >= max {
            return Duration::from_millis(min);
        }
        Duration::from_millis(self.rng.lock().gen_range(min..=max))
    }

    fn jitter_offset(&self, amplitude: f64) -> f64 {
        if amplitude <= 0.0 || !amplitude.is_finite() {
            return 0.0;
        }
        self.rng.lock().gen_range(-amplitude..=amplitude)
    }

    fn should_fail(&self, probability: f64) -> bool {
        if probability <= 0.0 || probability.is_nan() {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.lock().gen_bool(probability)
    }
}

/// Simulation returning fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedSimulation {
    latency: Duration,
    jitter_offset: f64,
    fail: bool,
}

impl FixedSimulation {
    /// Creates a fixed simulation.
    #[must_use]
    pub const fn new(latency: Duration, jitter_offset: f64, fail: bool) -> Self {
        Self {
            latency,
            jitter_offset,
            fail,
        }
    }

    /// A simulation that always fails with a non-zero failure probability.
    #[must_use]
    pub const fn failing() -> Self {
        Self::new(Duration::ZERO, 0.0, true)
    }
}

impl MarketSimulation for FixedSimulation {
    fn latency(&self, _profile: &SimulationProfile) -> Duration {
        self.latency
    }

    fn jitter_offset(&self, amplitude: f64) -> f64 {
        if !amplitude.is_finite() {
            return 0.0;
        }
        self.jitter_offset.clamp(-amplitude.abs(), amplitude.abs())
    }

    fn should_fail(&self, probability: f64) -> bool {
        self.fail && probability > 0.0
    }
}

/// Why a desk refused to quote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeskRejection {
    /// The pair is not in the desk's book.
    #[error("Currency conversion from {source_currency} to {target_currency} is not supported by {provider}")]
    UnsupportedPair {
        /// Desk provider.
        provider: ProviderId,
        /// Requested source.
        source_currency: CurrencyCode,
        /// Requested target.
        target_currency: CurrencyCode,
    },

    /// A code in the native request is not a supported currency.
    #[error("{0}")]
    UnknownCurrency(String),

    /// Simulated outage.
    #[error("{0} service temporarily unavailable")]
    TransientFailure(ProviderId),
}

/// Quoting core shared by the upstream simulators.
///
/// Waits the simulated latency, injects transient failures independently of
/// pair support, then returns the jittered base rate.
#[derive(Debug, Clone)]
pub struct SimulatedDesk {
    provider_id: ProviderId,
    table: RateTable,
    profile: SimulationProfile,
    simulation: Arc<dyn MarketSimulation>,
}

impl SimulatedDesk {
    /// Creates a desk.
    #[must_use]
    pub fn new(
        provider_id: ProviderId,
        table: RateTable,
        profile: SimulationProfile,
        simulation: Arc<dyn MarketSimulation>,
    ) -> Self {
        Self {
            provider_id,
            table,
            profile,
            simulation,
        }
    }

    /// Returns the desk's provider ID.
    #[inline]
    #[must_use]
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Parses raw codes from a native request and quotes them.
    ///
    /// # Errors
    ///
    /// Returns `DeskRejection::UnknownCurrency` for a code outside the
    /// allow-list, otherwise whatever [`quote`](Self::quote) returns.
    pub async fn quote_codes(&self, from: &str, to: &str) -> Result<Decimal, DeskRejection> {
        let source = CurrencyCode::parse(from, CurrencyField::Source)
            .map_err(|e| DeskRejection::UnknownCurrency(e.to_string()))?;
        let target = CurrencyCode::parse(to, CurrencyField::Target)
            .map_err(|e| DeskRejection::UnknownCurrency(e.to_string()))?;
        self.quote(source, target).await
    }

    /// Quotes a jittered rate for the pair.
    ///
    /// # Errors
    ///
    /// - `DeskRejection::TransientFailure` with the profile's probability
    /// - `DeskRejection::UnsupportedPair` if the pair is not in the book
    pub async fn quote(
        &self,
        source: CurrencyCode,
        target: CurrencyCode,
    ) -> Result<Decimal, DeskRejection> {
        let latency = self.simulation.latency(&self.profile);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self
            .simulation
            .should_fail(self.profile.failure_probability)
        {
            debug!(provider = %self.provider_id, "injecting transient failure");
            return Err(DeskRejection::TransientFailure(self.provider_id.clone()));
        }

        let base = self
            .table
            .lookup(source, target)
            .ok_or_else(|| DeskRejection::UnsupportedPair {
                provider: self.provider_id.clone(),
                source_currency: source,
                target_currency: target,
            })?;

        let offset = self.simulation.jitter_offset(self.profile.jitter);
        Ok(apply_jitter(base, offset))
    }
}

/// Scales `base` by `1 + offset`, keeping [`JITTERED_RATE_SCALE`] digits.
///
/// A non-finite offset leaves the rate unchanged.
#[must_use]
pub fn apply_jitter(base: Decimal, offset: f64) -> Decimal {
    let factor = Decimal::try_from(offset)
        .map(|offset| Decimal::ONE + offset.round_dp(6))
        .unwrap_or(Decimal::ONE);
    base.safe_mul(factor)
        .map_or(base, |rate| rate.round_dp(JITTERED_RATE_SCALE))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::parse(raw, CurrencyField::Source).unwrap()
    }

    fn desk(simulation: impl MarketSimulation + 'static, failure_probability: f64) -> SimulatedDesk {
        SimulatedDesk::new(
            ProviderId::new("API3"),
            RateTable::nested_json_defaults().unwrap(),
            SimulationProfile::new(0, 0, 0.025, failure_probability),
            Arc::new(simulation),
        )
    }

    #[tokio::test]
    async fn fixed_simulation_quotes_base_rate() {
        let rate = desk(FixedSimulation::default(), 0.1)
            .quote(code("USD"), code("EUR"))
            .await
            .unwrap();
        assert_eq!(rate, Decimal::new(865, 3));
    }

    #[tokio::test]
    async fn unsupported_pair_is_rejected() {
        let rejection = desk(FixedSimulation::default(), 0.0)
            .quote(code("AED"), code("QAR"))
            .await
            .unwrap_err();
        assert!(matches!(rejection, DeskRejection::UnsupportedPair { .. }));
        assert!(rejection.to_string().contains("not supported by API3"));
    }

    #[tokio::test]
    async fn quote_codes_rejects_unknown_currency() {
        let rejection = desk(FixedSimulation::default(), 0.0)
            .quote_codes("usd", "XYZ")
            .await
            .unwrap_err();
        assert!(matches!(rejection, DeskRejection::UnknownCurrency(_)));

        let rate = desk(FixedSimulation::default(), 0.0)
            .quote_codes("usd", "aud")
            .await
            .unwrap();
        assert_eq!(rate, Decimal::new(135, 2));
    }

    #[tokio::test]
    async fn failure_is_injected_before_lookup() {
        let rejection = desk(FixedSimulation::failing(), 0.1)
            .quote(code("AED"), code("QAR"))
            .await
            .unwrap_err();
        assert!(matches!(rejection, DeskRejection::TransientFailure(_)));
    }

    #[tokio::test]
    async fn zero_probability_never_fails() {
        let result = desk(FixedSimulation::failing(), 0.0)
            .quote(code("USD"), code("EUR"))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn fixed_offset_is_clamped_to_amplitude() {
        let simulation = FixedSimulation::new(Duration::ZERO, 0.5, false);
        assert!((simulation.jitter_offset(0.02) - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn seeded_simulations_are_reproducible() {
        let profile = SimulationProfile::new(100, 300, 0.02, 0.1);
        let a = RandomSimulation::seeded(7);
        let b = RandomSimulation::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.latency(&profile), b.latency(&profile));
            assert_eq!(a.should_fail(0.1), b.should_fail(0.1));
        }
    }

    #[test]
    fn seeded_failure_rate_tracks_probability() {
        let simulation = RandomSimulation::seeded(42);
        let failures = (0..1000).filter(|_| simulation.should_fail(0.1)).count();
        assert!((50..=150).contains(&failures), "{failures} failures in 1000");
    }

    #[test]
    fn overflowing_jitter_keeps_base_rate() {
        assert_eq!(apply_jitter(Decimal::MAX, 0.01), Decimal::MAX);
    }

    #[test]
    fn degenerate_probabilities() {
        let simulation = RandomSimulation::seeded(1);
        assert!(!simulation.should_fail(0.0));
        assert!(simulation.should_fail(1.0));
        assert_eq!(simulation.jitter_offset(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn latency_stays_within_bounds(seed in any::<u64>(), min in 0u64..500, span in 0u64..500) {
            let profile = SimulationProfile::new(min, min + span, 0.0, 0.0);
            let latency = RandomSimulation::seeded(seed).latency(&profile);
            prop_assert!(latency >= Duration::from_millis(min));
            prop_assert!(latency <= Duration::from_millis(min + span));
        }

        #[test]
        fn jittered_rate_stays_within_band(seed in any::<u64>(), cents in 1i64..100_000) {
            let base = Decimal::new(cents, 2);
            let offset = RandomSimulation::seeded(seed).jitter_offset(0.025);
            let rate = apply_jitter(base, offset);
            let band = base * Decimal::new(25, 3) + Decimal::new(1, 6);
            prop_assert!((rate - base).abs() <= band);
            prop_assert!(rate > Decimal::ZERO);
        }
    }
}

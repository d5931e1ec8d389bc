//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`RateAggregationEngine`]: concurrent offer collection and selection
//! - [`SelectionStrategy`]: strategies for picking the winning offer
//! - [`assemble`]: wraps a comparison into its response envelope

pub mod offer_selection;
pub mod rate_aggregation;
pub mod result_assembler;

pub use offer_selection::{BestConvertedAmountStrategy, SelectionStrategy};
pub use rate_aggregation::{AggregationError, AggregationResult, RateAggregationEngine};
pub use result_assembler::{ComparisonEnvelope, SUCCESS_MESSAGE, assemble};

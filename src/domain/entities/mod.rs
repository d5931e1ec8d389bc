//! # Domain Entities
//!
//! - [`RateRequest`]: validated conversion request
//! - [`Offer`]: one provider's canonical quote
//! - [`ComparisonResult`]: aggregation outcome

pub mod comparison;
pub mod offer;
pub mod rate_request;

pub use comparison::ComparisonResult;
pub use offer::{Offer, elapsed_ms};
pub use rate_request::RateRequest;

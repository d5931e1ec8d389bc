//! # Rate Compare
//!
//! Currency exchange rate aggregator.
//!
//! One conversion request is fanned out concurrently to every configured
//! provider. Each provider speaks its own wire format (flat JSON, XML or a
//! status-enveloped nested JSON) behind the [`RateProvider`] trait. Failed
//! providers are tolerated; the offer with the highest converted amount wins.
//!
//! # Architecture
//!
//! - [`domain`]: request, offer and comparison types with their validation
//! - [`application`]: the aggregation engine and offer selection
//! - [`infrastructure`]: provider adapters, transports and upstream simulators
//! - [`api`]: axum REST surface
//! - [`config`]: layered settings
//! - [`telemetry`]: tracing subscriber setup
//!
//! # Example
//!
//! ```ignore
//! use rate_compare::application::services::RateAggregationEngine;
//! use rate_compare::domain::entities::RateRequest;
//! use rust_decimal::Decimal;
//!
//! let engine = RateAggregationEngine::with_defaults(registry.providers().to_vec());
//! let request = RateRequest::new("USD", "EUR", Decimal::new(10000, 2))?;
//! let result = engine.compare(&request).await?;
//! println!("best: {}", result.best_offer());
//! ```
//!
//! [`RateProvider`]: infrastructure::providers::RateProvider

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

//! # Rate Providers
//!
//! Adapters for the bundled rate providers and their upstream simulators.
//!
//! # Modules
//!
//! - [`traits`]: The [`RateProvider`] port and provider health
//! - [`error`]: Provider error taxonomy and failure classification
//! - [`transport`]: Native request/reply plumbing and in-process transport
//! - [`http_client`]: reqwest-backed transport for remote upstreams
//! - [`simulation`]: Latency, jitter and failure injection
//! - [`rate_table`]: Per-desk base rate books
//! - [`flat_json`], [`xml`], [`nested_json`]: One module per wire format
//! - [`registry`]: Wiring from settings

pub mod error;
pub mod flat_json;
pub mod http_client;
pub mod nested_json;
pub mod rate_table;
pub mod registry;
pub mod simulation;
pub mod traits;
pub mod transport;
pub mod xml;

pub use error::{FailureKind, ProviderError, ProviderResult};
pub use registry::ProviderRegistry;
pub use traits::{ProviderHealth, ProviderHealthStatus, RateProvider};
pub use transport::{UpstreamService, UpstreamTransport, WireFormat, WireReply, WireRequest};

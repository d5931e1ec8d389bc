//! # Infrastructure Layer
//!
//! Provider adapters, upstream simulators and their transports.

pub mod providers;

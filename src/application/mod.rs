//! # Application Layer
//!
//! Use cases built on the domain: comparing offers across providers and
//! quoting a single provider.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};

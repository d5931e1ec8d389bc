//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`CurrencyCode`]: allow-listed, normalized currency code
//! - [`Amount`]: positive amount with at most two decimals
//! - [`ProviderId`], [`ComparisonId`]: identifiers
//! - [`CheckedArithmetic`]: overflow-safe decimal math

pub mod amount;
pub mod arithmetic;
pub mod currency;
pub mod ids;

pub use amount::{Amount, MAX_AMOUNT, MAX_AMOUNT_SCALE};
pub use arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic};
pub use currency::{CurrencyCode, SUPPORTED_CURRENCIES};
pub use ids::{ComparisonId, ProviderId};

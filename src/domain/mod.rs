//! # Domain Layer
//!
//! Request, offer and comparison types plus their validation rules. Nothing
//! in here performs I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use errors::{CurrencyField, DomainError, DomainResult};

//! # Identifiers
//!
//! - [`ProviderId`]: string identifier of a rate provider (`"API1"`, ...)
//! - [`ComparisonId`]: UUID correlating the log lines of one comparison

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a rate-quote provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a provider ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, used when resolving path parameters.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        self.0.eq_ignore_ascii_case(raw.trim())
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonId(Uuid);

impl ComparisonId {
    /// Generates a random comparison ID.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ComparisonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_matches_ignoring_case() {
        let id = ProviderId::new("API2");
        assert!(id.matches("api2"));
        assert!(id.matches(" API2 "));
        assert!(!id.matches("API3"));
    }

    #[test]
    fn comparison_ids_are_unique() {
        assert_ne!(ComparisonId::new_v4(), ComparisonId::new_v4());
    }
}

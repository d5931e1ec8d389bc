//! # Result Assembler
//!
//! Wraps a [`ComparisonResult`] into the response envelope.

use crate::domain::entities::ComparisonResult;
use serde::Serialize;

/// Message attached to every successful comparison.
pub const SUCCESS_MESSAGE: &str = "Exchange completed successfully";

/// Externally visible comparison envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonEnvelope {
    status_code: u16,
    message: String,
    data: ComparisonResult,
}

impl ComparisonEnvelope {
    /// Returns the status code carried in the body.
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns the message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the comparison payload.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &ComparisonResult {
        &self.data
    }
}

/// Wraps a comparison result.
#[must_use]
pub fn assemble(result: ComparisonResult) -> ComparisonEnvelope {
    ComparisonEnvelope {
        status_code: 200,
        message: SUCCESS_MESSAGE.to_string(),
        data: result,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{Offer, RateRequest};
    use crate::domain::value_objects::ProviderId;
    use rust_decimal::Decimal;
    use std::time::Duration;

    #[test]
    fn wraps_result_in_envelope() {
        let request = RateRequest::new("USD", "EUR", Decimal::new(10000, 2)).unwrap();
        let offer = Offer::new(
            ProviderId::new("API2"),
            &request,
            Decimal::new(8750, 2),
            Duration::from_millis(5),
        )
        .unwrap();
        let result = ComparisonResult::new(offer.clone(), vec![offer], 3).unwrap();

        let envelope = assemble(result);
        assert_eq!(envelope.status_code(), 200);
        assert_eq!(envelope.message(), SUCCESS_MESSAGE);

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["data"]["best_offer"]["provider"], "API2");
        assert_eq!(json["data"]["total_providers_queried"], 3);
        assert_eq!(json["data"]["successful_providers"], 1);
        assert_eq!(json["data"]["failed_providers"], 2);
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::model::SeatLabel;

/// Correlates a payment confirmation with the reservation it pays for.
///
/// The caller carries this between `reserve` and the payment callback; the
/// acting user is supplied separately by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservationToken {
    pub showtime_id: Uuid,
    pub seats: Vec<SeatLabel>,
}

impl ReservationToken {
    pub fn new(showtime_id: Uuid, seats: Vec<SeatLabel>) -> Self {
        Self { showtime_id, seats }
    }
}

/// External payment signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_outcome_wire_format() {
        let outcome: PaymentOutcome = serde_json::from_str("\"SUCCEEDED\"").unwrap();
        assert_eq!(outcome, PaymentOutcome::Succeeded);
        assert_eq!(serde_json::to_string(&PaymentOutcome::Failed).unwrap(), "\"FAILED\"");
    }
}

pub mod sweeper;
pub mod reservation;
pub mod finalizer;

pub use sweeper::ExpirySweeper;
pub use reservation::{ReservationOutcome, ReservationService};
pub use finalizer::{BookingFinalizer, FinalizeOutcome, PaymentResolution};

use cinema_core::SeatLabel;

/// Request order with repeated labels dropped
pub(crate) fn dedup_labels(labels: &[SeatLabel]) -> Vec<SeatLabel> {
    let mut seen = std::collections::HashSet::new();
    labels
        .iter()
        .filter(|label| seen.insert(*label))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let labels: Vec<SeatLabel> = ["A3", "A1", "A3", "A2", "A1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dedup_labels(&labels), vec!["A3", "A1", "A2"]);
    }
}

use chrono::{DateTime, Duration, Utc};
use cinema_core::{
    BookingError, BookingResult, HoldAttempt, ReservationToken, SeatLabel, SeatRepository,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use crate::sweeper::ExpirySweeper;

/// Per-seat result of a batch hold request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReservationOutcome {
    pub showtime_id: Uuid,
    pub held_seats: Vec<SeatLabel>,
    pub rejected_seats: Vec<SeatLabel>,
    /// Expiry shared by every hold placed in this call
    pub expires_at: DateTime<Utc>,
}

impl ReservationOutcome {
    /// True when no requested seat was rejected. Callers must treat anything
    /// else as a failed selection, even though the held seats stay held.
    pub fn is_complete(&self) -> bool {
        self.rejected_seats.is_empty()
    }

    pub fn token(&self) -> ReservationToken {
        ReservationToken::new(self.showtime_id, self.held_seats.clone())
    }
}

/// Places time-bounded holds on a user's seat selection.
///
/// Seats are processed one at a time in request order. A rejected seat does
/// not roll back holds already placed in the same call.
#[derive(Clone)]
pub struct ReservationService {
    repo: Arc<dyn SeatRepository>,
    sweeper: ExpirySweeper,
    hold_duration: Duration,
}

impl ReservationService {
    pub fn new(repo: Arc<dyn SeatRepository>, hold_duration: Duration) -> Self {
        Self {
            sweeper: ExpirySweeper::new(repo.clone()),
            repo,
            hold_duration,
        }
    }

    pub async fn reserve(
        &self,
        showtime_id: Uuid,
        seat_ids: &[SeatLabel],
        user: &str,
        now: DateTime<Utc>,
    ) -> BookingResult<ReservationOutcome> {
        if seat_ids.is_empty() {
            return Err(BookingError::NoSeatsSelected);
        }

        if self.repo.get_showtime(showtime_id).await?.is_none() {
            return Err(BookingError::ShowtimeNotFound(showtime_id));
        }

        let labels = crate::dedup_labels(seat_ids);
        self.sweeper.sweep_seats(showtime_id, &labels, now).await?;

        let mut held_seats = Vec::with_capacity(labels.len());
        let mut rejected_seats = Vec::new();

        for label in labels {
            match self.repo.try_hold(showtime_id, &label, user, self.hold_duration, now).await? {
                HoldAttempt::Held(_) => held_seats.push(label),
                HoldAttempt::Unavailable | HoldAttempt::UnknownSeat => rejected_seats.push(label),
            }
        }

        if rejected_seats.is_empty() {
            info!("User {} holds {:?} for showtime {}", user, held_seats, showtime_id);
        } else {
            warn!(
                "These seats are unavailable for {} on showtime {}: {}",
                user,
                showtime_id,
                rejected_seats.join(", ")
            );
        }

        Ok(ReservationOutcome {
            showtime_id,
            held_seats,
            rejected_seats,
            expires_at: now + self.hold_duration,
        })
    }
}

use chrono::{DateTime, Utc};
use cinema_core::{
    Booking, BookingConfirmation, BookingError, BookingNotifier, BookingResult, CommitAttempt,
    PaymentOutcome, SeatLabel, SeatRepository, Showtime,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use crate::sweeper::ExpirySweeper;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FinalizeOutcome {
    pub booked: Vec<SeatLabel>,
    /// Seats whose hold lapsed or was taken before payment came back
    pub rejected: Vec<SeatLabel>,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentResolution {
    Finalized(FinalizeOutcome),
    Abandoned,
}

/// Turns held seats into bookings once payment succeeds.
pub struct BookingFinalizer {
    repo: Arc<dyn SeatRepository>,
    notifier: Arc<dyn BookingNotifier>,
    sweeper: ExpirySweeper,
}

impl BookingFinalizer {
    pub fn new(repo: Arc<dyn SeatRepository>, notifier: Arc<dyn BookingNotifier>) -> Self {
        Self {
            sweeper: ExpirySweeper::new(repo.clone()),
            repo,
            notifier,
        }
    }

    async fn reservation_context(&self, showtime_id: Uuid, seat_ids: &[SeatLabel]) -> BookingResult<Showtime> {
        if seat_ids.is_empty() {
            return Err(BookingError::NoActiveReservation);
        }
        self.repo
            .get_showtime(showtime_id)
            .await?
            .ok_or(BookingError::NoActiveReservation)
    }

    /// True when `user` already owns a booking for every label, which means
    /// this token was confirmed before.
    async fn already_finalized(&self, showtime_id: Uuid, labels: &[SeatLabel], user: &str) -> BookingResult<bool> {
        let owned: HashSet<SeatLabel> = self
            .repo
            .list_bookings(user)
            .await?
            .into_iter()
            .filter(|b| b.showtime_id == showtime_id)
            .map(|b| b.seat_label)
            .collect();
        Ok(labels.iter().all(|label| owned.contains(label)))
    }

    /// Commit every seat still held by `user`.
    ///
    /// Fails with `NoActiveReservation` when there is nothing to finalize,
    /// including a confirmation replayed after its seats were booked.
    pub async fn finalize(
        &self,
        showtime_id: Uuid,
        seat_ids: &[SeatLabel],
        user: &str,
        now: DateTime<Utc>,
    ) -> BookingResult<FinalizeOutcome> {
        let showtime = self.reservation_context(showtime_id, seat_ids).await?;
        let labels = crate::dedup_labels(seat_ids);
        if self.already_finalized(showtime_id, &labels, user).await? {
            warn!("Replayed confirmation from {} for showtime {}", user, showtime_id);
            return Err(BookingError::NoActiveReservation);
        }
        self.sweeper.sweep_seats(showtime_id, &labels, now).await?;

        let mut outcome = FinalizeOutcome {
            booked: Vec::with_capacity(labels.len()),
            rejected: Vec::new(),
            bookings: Vec::with_capacity(labels.len()),
        };

        for label in labels {
            match self.repo.try_commit(&showtime, &label, user, now).await? {
                CommitAttempt::Booked(booking) => {
                    outcome.booked.push(label);
                    outcome.bookings.push(booking);
                }
                CommitAttempt::Unavailable | CommitAttempt::UnknownSeat => outcome.rejected.push(label),
            }
        }

        if !outcome.rejected.is_empty() {
            warn!(
                "Reservation lapsed for {} on showtime {}: {}",
                user,
                showtime_id,
                outcome.rejected.join(", ")
            );
        }

        if !outcome.booked.is_empty() {
            info!("Booking confirmed for {}: {:?} on showtime {}", user, outcome.booked, showtime_id);
            self.notify(&showtime, user, &outcome).await;
        }

        Ok(outcome)
    }

    /// Payment failed: the holds are left to lapse on their own.
    pub async fn abandon(&self, showtime_id: Uuid, seat_ids: &[SeatLabel], user: &str) -> BookingResult<()> {
        self.reservation_context(showtime_id, seat_ids).await?;
        info!(
            "Payment failed for {} on showtime {}; holds on {} lapse at expiry",
            user,
            showtime_id,
            seat_ids.join(", ")
        );
        Ok(())
    }

    pub async fn on_payment(
        &self,
        showtime_id: Uuid,
        seat_ids: &[SeatLabel],
        user: &str,
        outcome: PaymentOutcome,
        now: DateTime<Utc>,
    ) -> BookingResult<PaymentResolution> {
        match outcome {
            PaymentOutcome::Succeeded => self
                .finalize(showtime_id, seat_ids, user, now)
                .await
                .map(PaymentResolution::Finalized),
            PaymentOutcome::Failed => {
                self.abandon(showtime_id, seat_ids, user).await?;
                Ok(PaymentResolution::Abandoned)
            }
        }
    }

    // Bookings are already durable here; a failed notification is only logged.
    async fn notify(&self, showtime: &Showtime, user: &str, outcome: &FinalizeOutcome) {
        let movie_title = match self.repo.get_movie(showtime.movie_id).await {
            Ok(movie) => movie.map(|m| m.title).unwrap_or_default(),
            Err(e) => {
                warn!("Could not load movie {} for confirmation: {}", showtime.movie_id, e);
                String::new()
            }
        };

        let confirmation = BookingConfirmation {
            user_id: user.to_string(),
            showtime_id: showtime.id,
            movie_title,
            venue: showtime.venue.clone(),
            starts_at: showtime.starts_at,
            seats: outcome.booked.clone(),
            booking_ids: outcome.bookings.iter().map(|b| b.id).collect(),
        };

        if let Err(e) = self.notifier.booking_confirmed(&confirmation).await {
            warn!("Failed to send booking confirmation to {}: {}", user, e);
        }
    }
}

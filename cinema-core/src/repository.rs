use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use crate::model::{Booking, Movie, Seat, SeatLabel, Showtime};

/// Infrastructure failure from a persistence backend. Passed through as-is.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct StoreError(#[from] anyhow::Error);

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of an atomic check-and-hold on one seat
#[derive(Debug, Clone, PartialEq)]
pub enum HoldAttempt {
    Held(Seat),
    Unavailable,
    UnknownSeat,
}

/// Result of an atomic check-and-commit on one seat
#[derive(Debug, Clone, PartialEq)]
pub enum CommitAttempt {
    Booked(Booking),
    Unavailable,
    UnknownSeat,
}

/// Repository trait for showtimes, their seats and bookings.
///
/// `try_hold` and `try_commit` must evaluate the ledger preconditions and apply
/// the mutation indivisibly per seat. Different seats carry no ordering
/// requirement between each other.
#[async_trait]
pub trait SeatRepository: Send + Sync {
    /// Seed a showtime with its fixed seat layout
    async fn create_showtime(
        &self,
        movie: &Movie,
        showtime: &Showtime,
        labels: &[SeatLabel],
    ) -> StoreResult<Vec<Seat>>;

    async fn get_showtime(&self, showtime_id: Uuid) -> StoreResult<Option<Showtime>>;

    async fn get_movie(&self, movie_id: Uuid) -> StoreResult<Option<Movie>>;

    /// Showtimes of a movie, earliest first
    async fn list_showtimes(&self, movie_id: Uuid) -> StoreResult<Vec<Showtime>>;

    /// Seats of a showtime ordered by label
    async fn list_seats(&self, showtime_id: Uuid) -> StoreResult<Vec<Seat>>;

    /// Clear expired holds for a showtime, optionally limited to `labels`.
    /// Returns the number of seats reclaimed.
    async fn reclaim_expired(
        &self,
        showtime_id: Uuid,
        labels: Option<&[SeatLabel]>,
        now: DateTime<Utc>,
    ) -> StoreResult<u64>;

    async fn try_hold(
        &self,
        showtime_id: Uuid,
        label: &str,
        user: &str,
        hold_for: Duration,
        now: DateTime<Utc>,
    ) -> StoreResult<HoldAttempt>;

    /// Commit the seat and record its booking in one indivisible step
    async fn try_commit(
        &self,
        showtime: &Showtime,
        label: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<CommitAttempt>;

    /// Bookings made by `user`, newest first
    async fn list_bookings(&self, user: &str) -> StoreResult<Vec<Booking>>;
}

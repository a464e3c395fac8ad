pub mod model;
pub mod ledger;
pub mod clock;
pub mod repository;
pub mod notify;
pub mod payment;

pub use model::{Booking, Movie, Seat, SeatLabel, SeatStatus, Showtime, UserId};
pub use clock::{Clock, FixedClock, SystemClock};
pub use repository::{CommitAttempt, HoldAttempt, SeatRepository, StoreError, StoreResult};
pub use notify::{BookingConfirmation, BookingNotifier, LogNotifier};
pub use payment::{PaymentOutcome, ReservationToken};

/// Domain-level outcomes of the seat reservation and booking lifecycle.
///
/// Everything except `Store` is user-facing and recoverable. `Store` carries
/// persistence failures through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Seat unavailable: {0}")]
    SeatUnavailable(SeatLabel),
    #[error("No seats selected")]
    NoSeatsSelected,
    #[error("No active reservation found")]
    NoActiveReservation,
    #[error("Showtime not found: {0}")]
    ShowtimeNotFound(uuid::Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type BookingResult<T> = Result<T, BookingError>;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Seat label as printed on the seat map (e.g. "A1"). Unique within a showtime.
pub type SeatLabel = String;

/// Opaque identity of the acting user, as resolved by the identity provider.
pub type UserId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub rating: Option<f32>,
}

impl Movie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            genre: None,
            language: None,
            rating: None,
        }
    }
}

/// A scheduled screening of a movie at a venue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Showtime {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub venue: String,
    pub starts_at: DateTime<Utc>,
}

impl Showtime {
    pub fn new(movie_id: Uuid, venue: impl Into<String>, starts_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            movie_id,
            venue: venue.into(),
            starts_at,
        }
    }
}

/// A single seat of a showtime's fixed layout.
///
/// `booked` is terminal. A booked seat never carries hold metadata, and a hold
/// whose expiry has passed counts as free even before it is reclaimed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    pub id: Uuid,
    pub showtime_id: Uuid,
    pub label: SeatLabel,
    pub booked: bool,
    pub holder: Option<UserId>,
    pub hold_expiry: Option<DateTime<Utc>>,
}

impl Seat {
    pub fn new(showtime_id: Uuid, label: impl Into<SeatLabel>) -> Self {
        Self {
            id: Uuid::new_v4(),
            showtime_id,
            label: label.into(),
            booked: false,
            holder: None,
            hold_expiry: None,
        }
    }
}

/// Permanent record of a seat sold to a user. Created once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: UserId,
    pub seat_id: Uuid,
    pub seat_label: SeatLabel,
    pub movie_id: Uuid,
    pub showtime_id: Uuid,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(seat: &Seat, showtime: &Showtime, user_id: UserId, booked_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            seat_id: seat.id,
            seat_label: seat.label.clone(),
            movie_id: showtime.movie_id,
            showtime_id: showtime.id,
            booked_at,
        }
    }
}

/// Read-model view of a seat as seen by one caller at one instant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Free,
    Held {
        by_caller: bool,
        until: DateTime<Utc>,
    },
    Booked,
}

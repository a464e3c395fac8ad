use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::model::{SeatLabel, UserId};

/// Payload handed to the notifier once bookings are committed.
/// `seats` lists only the seats that were finally booked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingConfirmation {
    pub user_id: UserId,
    pub showtime_id: Uuid,
    pub movie_title: String,
    pub venue: String,
    pub starts_at: DateTime<Utc>,
    pub seats: Vec<SeatLabel>,
    pub booking_ids: Vec<Uuid>,
}

#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn booking_confirmed(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Notifier that only writes the confirmation to the log
pub struct LogNotifier;

#[async_trait]
impl BookingNotifier for LogNotifier {
    async fn booking_confirmed(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "Booking confirmed for {}: {} at {} ({}), seats {}",
            confirmation.user_id,
            confirmation.movie_title,
            confirmation.venue,
            confirmation.starts_at.format("%d %B %Y, %I:%M %p"),
            confirmation.seats.join(", ")
        );
        Ok(())
    }
}

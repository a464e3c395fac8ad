use chrono::{DateTime, Utc};
use cinema_core::{Seat, SeatLabel, SeatRepository, StoreResult};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Reclaims lapsed holds on the read path instead of on a timer.
///
/// A hold that lapsed may still look held to a reader until that reader's own
/// sweep runs; staleness is bounded by the hold duration.
#[derive(Clone)]
pub struct ExpirySweeper {
    repo: Arc<dyn SeatRepository>,
}

impl ExpirySweeper {
    pub fn new(repo: Arc<dyn SeatRepository>) -> Self {
        Self { repo }
    }

    /// Reclaim expired holds in an already loaded collection
    pub fn sweep(seats: &mut [Seat], now: DateTime<Utc>) -> usize {
        seats
            .iter_mut()
            .map(|seat| seat.reclaim_if_expired(now))
            .filter(|reclaimed| *reclaimed)
            .count()
    }

    pub async fn sweep_showtime(&self, showtime_id: Uuid, now: DateTime<Utc>) -> StoreResult<u64> {
        let reclaimed = self.repo.reclaim_expired(showtime_id, None, now).await?;
        if reclaimed > 0 {
            debug!("Reclaimed {} expired holds for showtime {}", reclaimed, showtime_id);
        }
        Ok(reclaimed)
    }

    pub async fn sweep_seats(
        &self,
        showtime_id: Uuid,
        labels: &[SeatLabel],
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let reclaimed = self.repo.reclaim_expired(showtime_id, Some(labels), now).await?;
        if reclaimed > 0 {
            debug!("Reclaimed {} expired holds for showtime {}", reclaimed, showtime_id);
        }
        Ok(reclaimed)
    }

    /// Seat listing for a showtime, swept first
    pub async fn seat_map(&self, showtime_id: Uuid, now: DateTime<Utc>) -> StoreResult<Vec<Seat>> {
        self.sweep_showtime(showtime_id, now).await?;
        let mut seats = self.repo.list_seats(showtime_id).await?;
        // Catches holds that lapsed between the sweep and the read
        Self::sweep(&mut seats, now);
        Ok(seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_sweep_reclaims_only_expired() {
        let now = Utc::now();
        let showtime_id = Uuid::new_v4();
        let mut seats = vec![
            Seat::new(showtime_id, "A1"),
            Seat::new(showtime_id, "A2"),
            Seat::new(showtime_id, "A3"),
        ];
        seats[0].place_hold("alice", Duration::minutes(5), now - Duration::minutes(10)).unwrap();
        seats[1].place_hold("bob", Duration::minutes(5), now).unwrap();

        assert_eq!(ExpirySweeper::sweep(&mut seats, now), 1);
        assert!(seats[0].holder.is_none());
        assert_eq!(seats[1].holder.as_deref(), Some("bob"));

        assert_eq!(ExpirySweeper::sweep(&mut seats, now), 0);
    }
}

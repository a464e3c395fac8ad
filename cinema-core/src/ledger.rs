//! Seat ledger: the only code allowed to change `booked`, `holder` and
//! `hold_expiry`.
//!
//! Holds are time-bounded leases. Nothing expires them in the background;
//! every check compares against the caller's `now`, and expired metadata is
//! cleared lazily by `reclaim_if_expired`.

use chrono::{DateTime, Duration, Utc};
use crate::model::{Seat, SeatStatus};
use crate::BookingError;

impl Seat {
    /// A hold is live iff its expiry is strictly in the future
    pub fn is_held(&self, now: DateTime<Utc>) -> bool {
        matches!(self.hold_expiry, Some(expiry) if now < expiry)
    }

    pub fn is_available_for(&self, user: &str, now: DateTime<Utc>) -> bool {
        !self.booked && (!self.is_held(now) || self.holder.as_deref() == Some(user))
    }

    /// Clears an expired hold. Returns whether anything changed.
    pub fn reclaim_if_expired(&mut self, now: DateTime<Utc>) -> bool {
        match self.hold_expiry {
            Some(expiry) if now >= expiry => {
                self.holder = None;
                self.hold_expiry = None;
                true
            }
            _ => false,
        }
    }

    /// Places or refreshes a hold for `user` until `now + duration`.
    pub fn place_hold(
        &mut self,
        user: &str,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, BookingError> {
        if !self.is_available_for(user, now) {
            return Err(BookingError::SeatUnavailable(self.label.clone()));
        }

        let expiry = now + duration;
        self.holder = Some(user.to_string());
        self.hold_expiry = Some(expiry);
        Ok(expiry)
    }

    /// Converts a live hold owned by `user` into a permanent booking.
    pub fn commit_booking(&mut self, user: &str, now: DateTime<Utc>) -> Result<(), BookingError> {
        if self.booked || !self.is_held(now) || self.holder.as_deref() != Some(user) {
            return Err(BookingError::SeatUnavailable(self.label.clone()));
        }

        self.booked = true;
        self.holder = None;
        self.hold_expiry = None;
        Ok(())
    }

    pub fn status_for(&self, user: Option<&str>, now: DateTime<Utc>) -> SeatStatus {
        if self.booked {
            return SeatStatus::Booked;
        }
        match self.hold_expiry {
            Some(until) if self.is_held(now) => SeatStatus::Held {
                by_caller: user.is_some() && self.holder.as_deref() == user,
                until,
            },
            _ => SeatStatus::Free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn seat() -> Seat {
        Seat::new(Uuid::new_v4(), "A1")
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-14T18:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn assert_booked_has_no_hold(seat: &Seat) {
        if seat.booked {
            assert!(seat.holder.is_none());
            assert!(seat.hold_expiry.is_none());
        }
    }

    #[test]
    fn test_hold_is_live_until_expiry() {
        let mut seat = seat();
        let expiry = seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();

        assert_eq!(expiry, t0() + Duration::minutes(5));
        assert!(seat.is_held(t0() + Duration::minutes(4)));
        assert!(!seat.is_held(expiry));
        assert!(!seat.is_held(expiry + Duration::seconds(1)));
    }

    #[test]
    fn test_second_user_cannot_take_live_hold() {
        let mut seat = seat();
        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();

        let result = seat.place_hold("bob", Duration::minutes(5), t0() + Duration::seconds(10));
        assert!(matches!(result, Err(BookingError::SeatUnavailable(ref l)) if l == "A1"));
        assert_eq!(seat.holder.as_deref(), Some("alice"));
        assert_eq!(seat.hold_expiry, Some(t0() + Duration::minutes(5)));
    }

    #[test]
    fn test_expired_hold_can_be_taken_by_another_user() {
        let mut seat = seat();
        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();

        let later = t0() + Duration::minutes(6);
        assert!(seat.is_available_for("bob", later));
        seat.place_hold("bob", Duration::minutes(5), later).unwrap();
        assert_eq!(seat.holder.as_deref(), Some("bob"));
    }

    #[test]
    fn test_rehold_by_owner_refreshes_expiry() {
        let mut seat = seat();
        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();
        let refreshed = seat.place_hold("alice", Duration::minutes(5), t0() + Duration::minutes(3)).unwrap();

        assert_eq!(refreshed, t0() + Duration::minutes(8));
        assert_eq!(seat.hold_expiry, Some(refreshed));
    }

    #[test]
    fn test_commit_clears_hold_metadata() {
        let mut seat = seat();
        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();
        seat.commit_booking("alice", t0() + Duration::minutes(1)).unwrap();

        assert!(seat.booked);
        assert_booked_has_no_hold(&seat);
    }

    #[test]
    fn test_commit_twice_fails() {
        let mut seat = seat();
        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();
        seat.commit_booking("alice", t0()).unwrap();

        assert!(seat.commit_booking("alice", t0()).is_err());
        assert!(seat.commit_booking("bob", t0()).is_err());
        assert_booked_has_no_hold(&seat);
    }

    #[test]
    fn test_commit_rejects_wrong_holder_and_expired_hold() {
        let mut seat = seat();
        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();

        assert!(seat.commit_booking("bob", t0()).is_err());
        assert!(seat.commit_booking("alice", t0() + Duration::minutes(5)).is_err());
        assert!(!seat.booked);

        // Never held at all
        let mut fresh = Seat::new(Uuid::new_v4(), "A2");
        assert!(fresh.commit_booking("alice", t0()).is_err());
    }

    #[test]
    fn test_booked_seat_refuses_holds() {
        let mut seat = seat();
        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();
        seat.commit_booking("alice", t0()).unwrap();

        assert!(!seat.is_available_for("alice", t0()));
        assert!(seat.place_hold("alice", Duration::minutes(5), t0()).is_err());
        assert_booked_has_no_hold(&seat);
    }

    #[test]
    fn test_reclaim_is_idempotent() {
        let mut seat = seat();
        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();

        // Not yet expired
        assert!(!seat.reclaim_if_expired(t0() + Duration::minutes(1)));
        assert!(seat.holder.is_some());

        let later = t0() + Duration::minutes(5);
        assert!(seat.reclaim_if_expired(later));
        let snapshot = seat.clone();
        assert!(!seat.reclaim_if_expired(later));
        assert_eq!(seat, snapshot);
        assert!(seat.holder.is_none() && seat.hold_expiry.is_none());
    }

    #[test]
    fn test_status_for_caller() {
        let mut seat = seat();
        assert_eq!(seat.status_for(Some("alice"), t0()), SeatStatus::Free);

        seat.place_hold("alice", Duration::minutes(5), t0()).unwrap();
        let until = t0() + Duration::minutes(5);
        assert_eq!(seat.status_for(Some("alice"), t0()), SeatStatus::Held { by_caller: true, until });
        assert_eq!(seat.status_for(Some("bob"), t0()), SeatStatus::Held { by_caller: false, until });
        assert_eq!(seat.status_for(None, t0()), SeatStatus::Held { by_caller: false, until });
        assert_eq!(seat.status_for(Some("bob"), until), SeatStatus::Free);

        seat.commit_booking("alice", t0()).unwrap();
        assert_eq!(seat.status_for(Some("alice"), t0()), SeatStatus::Booked);
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use cinema_core::{
    Booking, CommitAttempt, HoldAttempt, Movie, Seat, SeatLabel, SeatRepository, Showtime,
    StoreResult,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

struct ShowtimeEntry {
    showtime: Showtime,
    seats: BTreeMap<SeatLabel, Arc<Mutex<Seat>>>,
}

/// In-process seat repository.
///
/// Every seat sits behind its own mutex, so the ledger check and mutation for
/// one seat are indivisible while different seats proceed in parallel.
#[derive(Default)]
pub struct MemorySeatStore {
    movies: RwLock<HashMap<Uuid, Movie>>,
    showtimes: RwLock<HashMap<Uuid, ShowtimeEntry>>,
    bookings: Mutex<Vec<Booking>>,
}

impl MemorySeatStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn seat_cell(&self, showtime_id: Uuid, label: &str) -> Option<Arc<Mutex<Seat>>> {
        let showtimes = self.showtimes.read().await;
        showtimes
            .get(&showtime_id)
            .and_then(|entry| entry.seats.get(label))
            .cloned()
    }

    async fn seat_cells(&self, showtime_id: Uuid) -> Vec<Arc<Mutex<Seat>>> {
        let showtimes = self.showtimes.read().await;
        showtimes
            .get(&showtime_id)
            .map(|entry| entry.seats.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SeatRepository for MemorySeatStore {
    async fn create_showtime(
        &self,
        movie: &Movie,
        showtime: &Showtime,
        labels: &[SeatLabel],
    ) -> StoreResult<Vec<Seat>> {
        self.movies.write().await.insert(movie.id, movie.clone());

        let mut seats = BTreeMap::new();
        for label in labels {
            seats
                .entry(label.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Seat::new(showtime.id, label.clone()))));
        }

        let mut created = Vec::with_capacity(seats.len());
        for cell in seats.values() {
            created.push(cell.lock().await.clone());
        }

        self.showtimes.write().await.insert(
            showtime.id,
            ShowtimeEntry {
                showtime: showtime.clone(),
                seats,
            },
        );
        Ok(created)
    }

    async fn get_showtime(&self, showtime_id: Uuid) -> StoreResult<Option<Showtime>> {
        let showtimes = self.showtimes.read().await;
        Ok(showtimes.get(&showtime_id).map(|entry| entry.showtime.clone()))
    }

    async fn get_movie(&self, movie_id: Uuid) -> StoreResult<Option<Movie>> {
        Ok(self.movies.read().await.get(&movie_id).cloned())
    }

    async fn list_showtimes(&self, movie_id: Uuid) -> StoreResult<Vec<Showtime>> {
        let showtimes = self.showtimes.read().await;
        let mut listed: Vec<Showtime> = showtimes
            .values()
            .filter(|entry| entry.showtime.movie_id == movie_id)
            .map(|entry| entry.showtime.clone())
            .collect();
        listed.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(listed)
    }

    async fn list_seats(&self, showtime_id: Uuid) -> StoreResult<Vec<Seat>> {
        let mut seats = Vec::new();
        for cell in self.seat_cells(showtime_id).await {
            seats.push(cell.lock().await.clone());
        }
        Ok(seats)
    }

    async fn reclaim_expired(
        &self,
        showtime_id: Uuid,
        labels: Option<&[SeatLabel]>,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let cells = match labels {
            Some(labels) => {
                let mut cells = Vec::with_capacity(labels.len());
                for label in labels {
                    if let Some(cell) = self.seat_cell(showtime_id, label).await {
                        cells.push(cell);
                    }
                }
                cells
            }
            None => self.seat_cells(showtime_id).await,
        };

        let mut reclaimed = 0;
        for cell in cells {
            if cell.lock().await.reclaim_if_expired(now) {
                reclaimed += 1;
            }
        }
        Ok(reclaimed)
    }

    async fn try_hold(
        &self,
        showtime_id: Uuid,
        label: &str,
        user: &str,
        hold_for: Duration,
        now: DateTime<Utc>,
    ) -> StoreResult<HoldAttempt> {
        let Some(cell) = self.seat_cell(showtime_id, label).await else {
            return Ok(HoldAttempt::UnknownSeat);
        };

        let mut seat = cell.lock().await;
        seat.reclaim_if_expired(now);
        match seat.place_hold(user, hold_for, now) {
            Ok(_) => Ok(HoldAttempt::Held(seat.clone())),
            Err(_) => Ok(HoldAttempt::Unavailable),
        }
    }

    async fn try_commit(
        &self,
        showtime: &Showtime,
        label: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<CommitAttempt> {
        let Some(cell) = self.seat_cell(showtime.id, label).await else {
            return Ok(CommitAttempt::UnknownSeat);
        };

        // Seat lock is held until the booking row exists
        let mut seat = cell.lock().await;
        if seat.commit_booking(user, now).is_err() {
            return Ok(CommitAttempt::Unavailable);
        }

        let booking = Booking::new(&seat, showtime, user.to_string(), now);
        self.bookings.lock().await.push(booking.clone());
        Ok(CommitAttempt::Booked(booking))
    }

    async fn list_bookings(&self, user: &str) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.lock().await;
        let mut mine: Vec<Booking> = bookings
            .iter()
            .filter(|b| b.user_id == user)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(mine)
    }
}

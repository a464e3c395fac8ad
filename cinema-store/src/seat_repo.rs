use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use cinema_core::{
    Booking, CommitAttempt, HoldAttempt, Movie, Seat, SeatLabel, SeatRepository, Showtime,
    StoreResult,
};
use sqlx::PgPool;
use std::collections::BTreeSet;
use uuid::Uuid;

/// PostgreSQL-backed seat ledger.
///
/// Holds and commits are single conditional `UPDATE` statements, so the
/// availability check and the write happen under the same row lock.
pub struct PgSeatRepository {
    pool: PgPool,
}

impl PgSeatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn seat_exists(&self, showtime_id: Uuid, label: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM seats WHERE showtime_id = $1 AND label = $2)",
        )
        .bind(showtime_id)
        .bind(label)
        .fetch_one(&self.pool)
        .await
        .context("failed to look up seat")?;
        Ok(exists)
    }
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    genre: Option<String>,
    language: Option<String>,
    rating: Option<f32>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            genre: row.genre,
            language: row.language,
            rating: row.rating,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ShowtimeRow {
    id: Uuid,
    movie_id: Uuid,
    venue: String,
    starts_at: DateTime<Utc>,
}

impl From<ShowtimeRow> for Showtime {
    fn from(row: ShowtimeRow) -> Self {
        Showtime {
            id: row.id,
            movie_id: row.movie_id,
            venue: row.venue,
            starts_at: row.starts_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    id: Uuid,
    showtime_id: Uuid,
    label: String,
    booked: bool,
    holder: Option<String>,
    hold_expiry: Option<DateTime<Utc>>,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat {
            id: row.id,
            showtime_id: row.showtime_id,
            label: row.label,
            booked: row.booked,
            holder: row.holder,
            hold_expiry: row.hold_expiry,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: String,
    seat_id: Uuid,
    seat_label: String,
    movie_id: Uuid,
    showtime_id: Uuid,
    booked_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            seat_id: row.seat_id,
            seat_label: row.seat_label,
            movie_id: row.movie_id,
            showtime_id: row.showtime_id,
            booked_at: row.booked_at,
        }
    }
}

const SEAT_COLUMNS: &str = "id, showtime_id, label, booked, holder, hold_expiry";

#[async_trait]
impl SeatRepository for PgSeatRepository {
    async fn create_showtime(
        &self,
        movie: &Movie,
        showtime: &Showtime,
        labels: &[SeatLabel],
    ) -> StoreResult<Vec<Seat>> {
        let mut tx = self.pool.begin().await.context("failed to open transaction")?;

        sqlx::query(
            r#"
            INSERT INTO movies (id, title, genre, language, rating)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.genre)
        .bind(&movie.language)
        .bind(movie.rating)
        .execute(&mut *tx)
        .await
        .context("failed to insert movie")?;

        sqlx::query("INSERT INTO showtimes (id, movie_id, venue, starts_at) VALUES ($1, $2, $3, $4)")
            .bind(showtime.id)
            .bind(showtime.movie_id)
            .bind(&showtime.venue)
            .bind(showtime.starts_at)
            .execute(&mut *tx)
            .await
            .context("failed to insert showtime")?;

        let unique: BTreeSet<&SeatLabel> = labels.iter().collect();
        let mut seats = Vec::with_capacity(unique.len());
        for label in unique {
            let seat = Seat::new(showtime.id, label.clone());
            sqlx::query("INSERT INTO seats (id, showtime_id, label) VALUES ($1, $2, $3)")
                .bind(seat.id)
                .bind(seat.showtime_id)
                .bind(&seat.label)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to insert seat {}", seat.label))?;
            seats.push(seat);
        }

        tx.commit().await.context("failed to commit showtime")?;
        Ok(seats)
    }

    async fn get_showtime(&self, showtime_id: Uuid) -> StoreResult<Option<Showtime>> {
        let row = sqlx::query_as::<_, ShowtimeRow>(
            "SELECT id, movie_id, venue, starts_at FROM showtimes WHERE id = $1",
        )
        .bind(showtime_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to load showtime")?;
        Ok(row.map(Showtime::from))
    }

    async fn get_movie(&self, movie_id: Uuid) -> StoreResult<Option<Movie>> {
        let row = sqlx::query_as::<_, MovieRow>(
            "SELECT id, title, genre, language, rating FROM movies WHERE id = $1",
        )
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to load movie")?;
        Ok(row.map(Movie::from))
    }

    async fn list_showtimes(&self, movie_id: Uuid) -> StoreResult<Vec<Showtime>> {
        let rows = sqlx::query_as::<_, ShowtimeRow>(
            "SELECT id, movie_id, venue, starts_at FROM showtimes WHERE movie_id = $1 ORDER BY starts_at",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list showtimes")?;
        Ok(rows.into_iter().map(Showtime::from).collect())
    }

    async fn list_seats(&self, showtime_id: Uuid) -> StoreResult<Vec<Seat>> {
        let rows = sqlx::query_as::<_, SeatRow>(&format!(
            "SELECT {} FROM seats WHERE showtime_id = $1 ORDER BY label",
            SEAT_COLUMNS
        ))
        .bind(showtime_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list seats")?;
        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn reclaim_expired(
        &self,
        showtime_id: Uuid,
        labels: Option<&[SeatLabel]>,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE seats
            SET holder = NULL, hold_expiry = NULL
            WHERE showtime_id = $1
              AND hold_expiry IS NOT NULL
              AND hold_expiry <= $2
              AND ($3::text[] IS NULL OR label = ANY($3))
            "#,
        )
        .bind(showtime_id)
        .bind(now)
        .bind(labels.map(|l| l.to_vec()))
        .execute(&self.pool)
        .await
        .context("failed to reclaim expired holds")?;
        Ok(result.rows_affected())
    }

    async fn try_hold(
        &self,
        showtime_id: Uuid,
        label: &str,
        user: &str,
        hold_for: Duration,
        now: DateTime<Utc>,
    ) -> StoreResult<HoldAttempt> {
        // An expired hold is overwritten in place, which also reclaims it
        let row = sqlx::query_as::<_, SeatRow>(&format!(
            r#"
            UPDATE seats
            SET holder = $3, hold_expiry = $4
            WHERE showtime_id = $1
              AND label = $2
              AND booked = FALSE
              AND (hold_expiry IS NULL OR hold_expiry <= $5 OR holder = $3)
            RETURNING {}
            "#,
            SEAT_COLUMNS
        ))
        .bind(showtime_id)
        .bind(label)
        .bind(user)
        .bind(now + hold_for)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .context("failed to place hold")?;

        match row {
            Some(row) => Ok(HoldAttempt::Held(row.into())),
            None if self.seat_exists(showtime_id, label).await? => Ok(HoldAttempt::Unavailable),
            None => Ok(HoldAttempt::UnknownSeat),
        }
    }

    async fn try_commit(
        &self,
        showtime: &Showtime,
        label: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<CommitAttempt> {
        let mut tx = self.pool.begin().await.context("failed to open transaction")?;

        let row = sqlx::query_as::<_, SeatRow>(&format!(
            r#"
            UPDATE seats
            SET booked = TRUE, holder = NULL, hold_expiry = NULL
            WHERE showtime_id = $1
              AND label = $2
              AND booked = FALSE
              AND holder = $3
              AND hold_expiry > $4
            RETURNING {}
            "#,
            SEAT_COLUMNS
        ))
        .bind(showtime.id)
        .bind(label)
        .bind(user)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .context("failed to commit seat")?;

        let Some(row) = row else {
            tx.rollback().await.context("failed to roll back")?;
            return if self.seat_exists(showtime.id, label).await? {
                Ok(CommitAttempt::Unavailable)
            } else {
                Ok(CommitAttempt::UnknownSeat)
            };
        };

        let seat = Seat::from(row);
        let booking = Booking::new(&seat, showtime, user.to_string(), now);
        let inserted = sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, seat_id, seat_label, movie_id, showtime_id, booked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.user_id)
        .bind(booking.seat_id)
        .bind(&booking.seat_label)
        .bind(booking.movie_id)
        .bind(booking.showtime_id)
        .bind(booking.booked_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            // bookings.seat_id is UNIQUE; a second booking for the seat loses
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tx.rollback().await.context("failed to roll back")?;
                return Ok(CommitAttempt::Unavailable);
            }
            Err(e) => return Err(anyhow::Error::from(e).context("failed to insert booking").into()),
        }

        tx.commit().await.context("failed to commit booking")?;
        Ok(CommitAttempt::Booked(booking))
    }

    async fn list_bookings(&self, user: &str) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, user_id, seat_id, seat_label, movie_id, showtime_id, booked_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY booked_at DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .context("failed to list bookings")?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }
}

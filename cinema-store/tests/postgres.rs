//! Runs against a live database: `DATABASE_URL=postgres://... cargo test -- --ignored`

use chrono::{Duration, Utc};
use cinema_core::{CommitAttempt, HoldAttempt, Movie, SeatRepository, Showtime};
use cinema_store::PgSeatRepository;
use sqlx::PgPool;
use std::sync::Arc;

async fn repo_with_seat(pool: PgPool) -> (Arc<PgSeatRepository>, Showtime) {
    let repo = Arc::new(PgSeatRepository::new(pool));
    let movie = Movie::new("Dangal");
    let showtime = Showtime::new(movie.id, "Screen 2", Utc::now());
    repo.create_showtime(&movie, &showtime, &["B7".to_string()])
        .await
        .unwrap();
    (repo, showtime)
}

#[sqlx::test(migrations = "../migrations")]
#[ignore]
async fn test_pg_concurrent_holds_have_one_winner(pool: PgPool) {
    let (repo, showtime) = repo_with_seat(pool).await;
    let now = Utc::now();

    let attempts = (0..16).map(|i| {
        let repo = repo.clone();
        let showtime_id = showtime.id;
        tokio::spawn(async move {
            repo.try_hold(showtime_id, "B7", &format!("user-{}", i), Duration::minutes(5), now)
                .await
                .unwrap()
        })
    });

    let winners: Vec<_> = futures_util::future::join_all(attempts)
        .await
        .into_iter()
        .filter_map(|r| match r.unwrap() {
            HoldAttempt::Held(seat) => Some(seat),
            _ => None,
        })
        .collect();

    assert_eq!(winners.len(), 1);
    let seats = repo.list_seats(showtime.id).await.unwrap();
    assert_eq!(seats[0].holder, winners[0].holder);
}

#[sqlx::test(migrations = "../migrations")]
#[ignore]
async fn test_pg_concurrent_commits_book_seat_once(pool: PgPool) {
    let (repo, showtime) = repo_with_seat(pool).await;
    let now = Utc::now();
    repo.try_hold(showtime.id, "B7", "alice", Duration::minutes(5), now)
        .await
        .unwrap();

    let attempts = (0..8).map(|_| {
        let repo = repo.clone();
        let showtime = showtime.clone();
        tokio::spawn(async move { repo.try_commit(&showtime, "B7", "alice", now).await.unwrap() })
    });

    let booked = futures_util::future::join_all(attempts)
        .await
        .into_iter()
        .filter(|r| matches!(r, Ok(CommitAttempt::Booked(_))))
        .count();

    assert_eq!(booked, 1);
    assert_eq!(repo.list_bookings("alice").await.unwrap().len(), 1);
    let seat = &repo.list_seats(showtime.id).await.unwrap()[0];
    assert!(seat.booked && seat.holder.is_none());
}

#[sqlx::test(migrations = "../migrations")]
#[ignore]
async fn test_pg_expired_hold_is_taken_over(pool: PgPool) {
    let (repo, showtime) = repo_with_seat(pool).await;
    let now = Utc::now();
    repo.try_hold(showtime.id, "B7", "alice", Duration::minutes(5), now)
        .await
        .unwrap();

    let early = repo
        .try_hold(showtime.id, "B7", "bob", Duration::minutes(5), now + Duration::minutes(4))
        .await
        .unwrap();
    assert_eq!(early, HoldAttempt::Unavailable);

    let later = now + Duration::minutes(5);
    assert!(matches!(
        repo.try_hold(showtime.id, "B7", "bob", Duration::minutes(5), later).await.unwrap(),
        HoldAttempt::Held(_)
    ));
    assert_eq!(
        repo.try_commit(&showtime, "B7", "alice", later).await.unwrap(),
        CommitAttempt::Unavailable
    );
}

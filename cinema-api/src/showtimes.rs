use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use cinema_core::{ReservationToken, SeatLabel, SeatStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::AppError;
use crate::identity::ActingUser;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SeatView {
    pub label: SeatLabel,
    #[serde(flatten)]
    pub status: SeatStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeatMapResponse {
    pub showtime_id: Uuid,
    pub venue: String,
    pub starts_at: DateTime<Utc>,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    #[serde(default)]
    pub seats: Vec<SeatLabel>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReserveResponse {
    pub held: Vec<SeatLabel>,
    pub rejected: Vec<SeatLabel>,
    /// Present only when every requested seat is held
    pub reservation: Option<ReservationToken>,
    pub expires_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/showtimes/{id}/seats", get(seat_map))
        .route("/v1/showtimes/{id}/reservations", post(reserve_seats))
}

/// GET /v1/showtimes/{id}/seats
async fn seat_map(
    State(state): State<AppState>,
    Path(showtime_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SeatMapResponse>, AppError> {
    let showtime = state
        .repo
        .get_showtime(showtime_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Showtime not found: {}", showtime_id)))?;

    let now = state.clock.now();
    let viewer = ActingUser::from_headers(&headers);
    let seats = state
        .sweeper
        .seat_map(showtime_id, now)
        .await?
        .into_iter()
        .map(|seat| SeatView {
            status: seat.status_for(viewer.as_ref().map(|u| u.0.as_str()), now),
            label: seat.label,
        })
        .collect();

    Ok(Json(SeatMapResponse {
        showtime_id,
        venue: showtime.venue,
        starts_at: showtime.starts_at,
        seats,
    }))
}

/// POST /v1/showtimes/{id}/reservations
async fn reserve_seats(
    State(state): State<AppState>,
    Path(showtime_id): Path<Uuid>,
    ActingUser(user): ActingUser,
    Json(req): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<ReserveResponse>), AppError> {
    let now = state.clock.now();
    let outcome = state.reservations.reserve(showtime_id, &req.seats, &user, now).await?;

    if outcome.is_complete() {
        return Ok((
            StatusCode::OK,
            Json(ReserveResponse {
                reservation: Some(outcome.token()),
                expires_at: Some(outcome.expires_at),
                held: outcome.held_seats,
                rejected: Vec::new(),
                error: None,
            }),
        ));
    }

    // Seats held in this call stay held; the client re-reads the seat map
    Ok((
        StatusCode::CONFLICT,
        Json(ReserveResponse {
            error: Some(format!("These seats are unavailable: {}", outcome.rejected_seats.join(", "))),
            held: outcome.held_seats,
            rejected: outcome.rejected_seats,
            reservation: None,
            expires_at: None,
        }),
    ))
}

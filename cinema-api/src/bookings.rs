use axum::{extract::State, routing::get, Json, Router};
use cinema_core::Booking;
use crate::error::AppError;
use crate::identity::ActingUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", get(list_bookings))
}

/// GET /v1/bookings
async fn list_bookings(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.repo.list_bookings(&user).await?))
}
